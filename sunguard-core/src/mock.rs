//! Simulated board for host tests
//!
//! Every double shares one [`Sim`]: a millisecond clock that only moves
//! when something waits (a delay, a blocking note, a sleep) plus the
//! records tests assert on. Button presses are scheduled as time windows.

extern crate std;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use crate::config::{SENSOR_SETTLE_MS, TICK_PERIOD_MS};
use crate::device::{Board, Hardware};
use crate::error::Error;
use crate::tick::TickCounter;
use crate::traits::{
    Button, Buttons, ByteStore, Clock, Level, PowerControl, SupplyMonitor, TickSource,
    ToneGenerator, UvSensor,
};

/// Byte store backed by an array, counting writes
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub bytes: [u8; 16],
    pub writes: u32,
    pub fail_writes: bool,
}

impl MemoryStore {
    /// Erased EEPROM
    pub fn blank() -> Self {
        Self {
            bytes: [0xFF; 16],
            writes: 0,
            fail_writes: false,
        }
    }

    /// Initialised store holding `class`
    pub fn with_skin_class(class: u8) -> Self {
        use crate::settings::*;

        let mut store = Self::blank();
        store.bytes[CHECKBYTE_A_ADDR as usize] = CHECKBYTE_A;
        store.bytes[CHECKBYTE_B_ADDR as usize] = CHECKBYTE_B;
        store.bytes[SKIN_CLASS_ADDR as usize] = class;
        store
    }
}

impl ByteStore for MemoryStore {
    fn read_byte(&mut self, address: u16) -> u8 {
        self.bytes[address as usize]
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Error::Storage);
        }
        self.bytes[address as usize] = value;
        self.writes += 1;
        Ok(())
    }
}

/// A note as the buzzer saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedTone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
    pub overlap: bool,
    pub at_ms: u64,
}

pub struct SimInner {
    now: Cell<u64>,
    ticks: TickCounter,
    ticking: Cell<bool>,
    wake_armed: Cell<bool>,
    sensor_powered_at: Cell<Option<u64>>,
    tone_on: Cell<bool>,
    presses: RefCell<Vec<(Button, u64, u64)>>,
    stray_wakes: RefCell<Vec<u64>>,
    tones: RefCell<Vec<PlayedTone>>,
    store: RefCell<MemoryStore>,
    pub sensor_present: Cell<bool>,
    pub uv_raw: Cell<u16>,
    pub sensor_reads: Cell<u32>,
    pub supply_centivolts: Cell<u16>,
    pub sleeps: Cell<u32>,
    pub wakes_armed_sleeps: Cell<u32>,
    pub armed_while_pressed: Cell<bool>,
}

/// Shared simulation state
#[derive(Clone)]
pub struct Sim(Rc<SimInner>);

impl core::ops::Deref for Sim {
    type Target = SimInner;

    fn deref(&self) -> &SimInner {
        &self.0
    }
}

impl Sim {
    pub fn new() -> Self {
        Self(Rc::new(SimInner {
            now: Cell::new(0),
            ticks: TickCounter::new(),
            ticking: Cell::new(false),
            wake_armed: Cell::new(false),
            sensor_powered_at: Cell::new(None),
            tone_on: Cell::new(false),
            presses: RefCell::new(Vec::new()),
            stray_wakes: RefCell::new(Vec::new()),
            tones: RefCell::new(Vec::new()),
            store: RefCell::new(MemoryStore::with_skin_class(1)),
            sensor_present: Cell::new(true),
            uv_raw: Cell::new(0),
            sensor_reads: Cell::new(0),
            supply_centivolts: Cell::new(300),
            sleeps: Cell::new(0),
            wakes_armed_sleeps: Cell::new(0),
            armed_while_pressed: Cell::new(false),
        }))
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn ticks(&self) -> &TickCounter {
        &self.ticks
    }

    pub fn set_store(&self, store: MemoryStore) {
        *self.store.borrow_mut() = store;
    }

    pub fn store(&self) -> MemoryStore {
        self.store.borrow().clone()
    }

    pub fn ticking(&self) -> bool {
        self.ticking.get()
    }

    pub fn wake_armed(&self) -> bool {
        self.wake_armed.get()
    }

    pub fn sensor_powered(&self) -> bool {
        self.sensor_powered_at.get().is_some()
    }

    /// Hold `button` down from `from_ms` until `to_ms`.
    pub fn press(&self, button: Button, from_ms: u64, to_ms: u64) {
        self.presses.borrow_mut().push((button, from_ms, to_ms));
    }

    fn is_pressed(&self, button: Button) -> bool {
        let now = self.now();
        self.presses
            .borrow()
            .iter()
            .any(|&(b, from, to)| b == button && from <= now && now < to)
    }

    /// Fire the wake interrupt at `at_ms` without a press, as a contact
    /// bounce or glitch on the line would.
    pub fn stray_wake(&self, at_ms: u64) {
        self.stray_wakes.borrow_mut().push(at_ms);
    }

    fn next_stray_wake(&self) -> Option<u64> {
        let now = self.now();
        self.stray_wakes.borrow().iter().copied().filter(|&at| at > now).min()
    }

    fn next_press_start(&self, button: Button) -> Option<u64> {
        let now = self.now();
        self.presses
            .borrow()
            .iter()
            .filter(|&&(b, from, _)| b == button && from > now)
            .map(|&(_, from, _)| from)
            .min()
    }

    pub fn tones(&self) -> Vec<PlayedTone> {
        self.tones.borrow().clone()
    }

    pub fn count_of(&self, frequency_hz: u32) -> usize {
        self.tones
            .borrow()
            .iter()
            .filter(|t| t.frequency_hz == frequency_hz)
            .count()
    }

    pub fn clear_tones(&self) {
        self.tones.borrow_mut().clear();
    }
}

pub struct SimClock(Sim);

impl SimClock {
    pub fn new(sim: &Sim) -> Self {
        Self(sim.clone())
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.0.now()
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.advance(ms as u64);
    }
}

pub struct SimTones(Sim);

impl SimTones {
    pub fn new(sim: &Sim) -> Self {
        Self(sim.clone())
    }

    pub fn count_of(&self, frequency_hz: u32) -> usize {
        self.0.count_of(frequency_hz)
    }

    pub fn stopped(&self) -> bool {
        !self.0.tone_on.get()
    }
}

impl ToneGenerator for SimTones {
    async fn play(&mut self, frequency_hz: u32, duration_ms: u32, overlap: bool) {
        self.0.tones.borrow_mut().push(PlayedTone {
            frequency_hz,
            duration_ms,
            overlap,
            at_ms: self.0.now(),
        });
        if overlap {
            self.0.tone_on.set(true);
        } else {
            self.0.advance(duration_ms as u64);
            self.0.tone_on.set(false);
        }
    }

    fn stop(&mut self) {
        self.0.tone_on.set(false);
    }
}

pub struct SimButtons {
    sim: Sim,
    levels: [Level; 3],
}

impl SimButtons {
    pub fn new(sim: &Sim) -> Self {
        Self {
            sim: sim.clone(),
            levels: [Level::High; 3],
        }
    }

    pub fn press(&mut self, button: Button, from_ms: u64, to_ms: u64) {
        self.sim.press(button, from_ms, to_ms);
    }
}

impl Buttons for SimButtons {
    fn update(&mut self, button: Button) -> bool {
        let level = if self.sim.is_pressed(button) {
            Level::Low
        } else {
            Level::High
        };
        let changed = self.levels[button.index()] != level;
        self.levels[button.index()] = level;
        changed
    }

    fn level(&self, button: Button) -> Level {
        self.levels[button.index()]
    }
}

pub struct SimSensor(Sim);

impl UvSensor for SimSensor {
    fn begin(&mut self) -> Result<(), Error> {
        if self.0.sensor_present.get() {
            Ok(())
        } else {
            Err(Error::SensorInit)
        }
    }

    fn read_uv_index_raw(&mut self) -> Result<u16, Error> {
        let powered_at = self
            .0
            .sensor_powered_at
            .get()
            .expect("sensor read while unpowered");
        assert!(
            self.0.now() - powered_at >= SENSOR_SETTLE_MS as u64,
            "sensor read before settling"
        );
        self.0.sensor_reads.set(self.0.sensor_reads.get() + 1);
        Ok(self.0.uv_raw.get())
    }
}

pub struct SimStore(Sim);

impl ByteStore for SimStore {
    fn read_byte(&mut self, address: u16) -> u8 {
        self.0.store.borrow_mut().read_byte(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Error> {
        self.0.store.borrow_mut().write_byte(address, value)
    }
}

pub struct SimSupply(Sim);

impl SupplyMonitor for SimSupply {
    async fn read_supply_centivolts(&mut self) -> u16 {
        self.0.supply_centivolts.get()
    }
}

pub struct SimPower(Sim);

impl PowerControl for SimPower {
    async fn enter_low_power(&mut self) {
        let sim = &self.0;
        sim.sleeps.set(sim.sleeps.get() + 1);

        if sim.ticking.get() {
            let period = TICK_PERIOD_MS as u64;
            // A power press can wake us early only while the edge interrupt is armed
            let edge = sim
                .next_press_start(Button::Power)
                .filter(|&at| sim.wake_armed.get() && at < sim.now() + period);
            match edge {
                Some(at) => sim.now.set(at),
                None => {
                    sim.advance(period);
                    sim.ticks.on_tick();
                }
            }
        } else if sim.wake_armed.get() {
            sim.wakes_armed_sleeps.set(sim.wakes_armed_sleeps.get() + 1);
            let edge = match (sim.next_press_start(Button::Power), sim.next_stray_wake()) {
                (Some(press), Some(stray)) => press.min(stray),
                (press, stray) => press
                    .or(stray)
                    .expect("asleep with nothing scheduled to wake us"),
            };
            sim.now.set(edge);
        } else {
            panic!("sleep with no wake source enabled");
        }
    }

    fn gate_sensor(&mut self, on: bool) {
        let sim = &self.0;
        match (on, sim.sensor_powered_at.get()) {
            (true, None) => sim.sensor_powered_at.set(Some(sim.now())),
            (false, _) => sim.sensor_powered_at.set(None),
            _ => {}
        }
    }

    fn arm_wake(&mut self, armed: bool) {
        if armed && self.0.is_pressed(Button::Power) {
            self.0.armed_while_pressed.set(true);
        }
        self.0.wake_armed.set(armed);
    }
}

pub struct SimTicker(Sim);

impl TickSource for SimTicker {
    fn start(&mut self) {
        self.0.ticking.set(true);
    }

    fn stop(&mut self) {
        self.0.ticking.set(false);
    }
}

/// Type bundle for [`Device`](crate::device::Device) under test
pub struct SimBoard;

impl Board for SimBoard {
    type Sensor = SimSensor;
    type Tones = SimTones;
    type Buttons = SimButtons;
    type Store = SimStore;
    type Supply = SimSupply;
    type Power = SimPower;
    type Ticker = SimTicker;
    type Clock = SimClock;
}

pub fn sim_hardware(sim: &Sim) -> Hardware<SimBoard> {
    Hardware {
        sensor: SimSensor(sim.clone()),
        tones: SimTones::new(sim),
        buttons: SimButtons::new(sim),
        store: SimStore(sim.clone()),
        supply: SimSupply(sim.clone()),
        power: SimPower(sim.clone()),
        ticker: SimTicker(sim.clone()),
        clock: SimClock::new(sim),
    }
}
