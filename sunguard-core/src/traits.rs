//! Collaborator traits
//!
//! The controller only ever talks to hardware through these. The firmware
//! crate implements them for the STM32L031 board; the host tests implement
//! them over simulated time.

use crate::error::Error;

/// Debounced logical level of an active-low button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Pressed
    Low,
    /// Released
    High,
}

impl Level {
    pub fn is_pressed(self) -> bool {
        self == Level::Low
    }
}

/// The three controls on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Wakes the device, stops a session, acknowledges the alarm
    Power,
    /// Cycles the skin class in config mode
    Skin,
    /// Cycles the SPF (short press) or starts a session (long press)
    Set,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Power, Button::Skin, Button::Set];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// UV sensor reporting the UV index scaled by 100
pub trait UvSensor {
    /// Probe and configure the sensor. Only called once, at boot.
    fn begin(&mut self) -> Result<(), Error>;

    /// UV index × 100. The sensor must be powered and settled.
    fn read_uv_index_raw(&mut self) -> Result<u16, Error>;
}

/// Debounced button inputs
pub trait Buttons {
    /// Sample the pin and return `true` if the debounced level changed.
    fn update(&mut self, button: Button) -> bool;

    /// Debounced level as of the last [`Buttons::update`].
    fn level(&self, button: Button) -> Level;
}

/// Piezo tone generator
pub trait ToneGenerator {
    /// Sound `frequency_hz` for `duration_ms`.
    ///
    /// Without `overlap` the call returns once the note has finished and
    /// the buzzer is silent again. With `overlap` it returns immediately
    /// and the note keeps sounding until the next `play` or [`stop`].
    ///
    /// [`stop`]: ToneGenerator::stop
    async fn play(&mut self, frequency_hz: u32, duration_ms: u32, overlap: bool);

    fn stop(&mut self);
}

/// Byte-addressed persistent storage
pub trait ByteStore {
    fn read_byte(&mut self, address: u16) -> u8;

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Error>;
}

/// Supply voltage sampler
pub trait SupplyMonitor {
    /// Supply voltage in centivolts (3.00 V reads as 300)
    async fn read_supply_centivolts(&mut self) -> u16;
}

/// Sleep/wake transitions and power gating
pub trait PowerControl {
    /// Enter the deepest available sleep mode and return after the next
    /// enabled interrupt, whichever one it was.
    async fn enter_low_power(&mut self);

    /// Switch the UV sensor supply.
    fn gate_sensor(&mut self, on: bool);

    /// Enable or disable the power-button wake interrupt.
    fn arm_wake(&mut self, armed: bool);
}

/// Periodic tick interrupt control
///
/// The interrupt itself reports into a shared
/// [`TickCounter`](crate::tick::TickCounter).
pub trait TickSource {
    fn start(&mut self);

    fn stop(&mut self);
}

/// Millisecond time base
pub trait Clock {
    fn now_ms(&self) -> u64;

    async fn delay_ms(&mut self, ms: u32);
}
