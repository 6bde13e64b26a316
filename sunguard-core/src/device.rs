//! Device controller
//!
//! Owns every collaborator and all session state, and runs one state of the
//! [`DeviceState`] machine per [`Device::step`]:
//!
//! - **PowerOff**: sensor off, timers off, shutdown tune, sleep until the
//!   power button wakes us.
//! - **Config**: poll the buttons to pick skin class and SPF; a long press
//!   of *set* starts a session, 30 s of silence powers off.
//! - **Running**: sleep between tick interrupts; once a minute sample the
//!   supply and the UV sensor and consume the budget.
//! - **Completed**: sound the alarm, then power off.

use crate::button::{Press, PressTracker};
use crate::config::{
    BUTTON_POLL_MS, CONFIG_INACTIVITY_MS, COUNT_BEEP_PAUSE_MS, LOW_BATTERY_CENTIVOLTS,
    SENSOR_SETTLE_MS, SESSION_CEILING_MINUTES, WAKE_CONFIRM_MS,
};
use crate::error::Error;
use crate::exposure::{BurnBudget, ExposureProfile, SpfIndex, uv_index_from_raw};
use crate::feedback::{self, AlarmOutcome};
use crate::settings::Settings;
use crate::state::{DeviceState, Event};
use crate::tick::TickCounter;
use crate::traits::{
    Button, Buttons, ByteStore, Clock, PowerControl, SupplyMonitor, TickSource, ToneGenerator,
    UvSensor,
};

/// Concrete collaborator types for one board
pub trait Board {
    type Sensor: UvSensor;
    type Tones: ToneGenerator;
    type Buttons: Buttons;
    type Store: ByteStore;
    type Supply: SupplyMonitor;
    type Power: PowerControl;
    type Ticker: TickSource;
    type Clock: Clock;
}

/// All collaborators the controller drives
pub struct Hardware<B: Board> {
    pub sensor: B::Sensor,
    pub tones: B::Tones,
    pub buttons: B::Buttons,
    pub store: B::Store,
    pub supply: B::Supply,
    pub power: B::Power,
    pub ticker: B::Ticker,
    pub clock: B::Clock,
}

/// The wearable's controller context
pub struct Device<'a, B: Board> {
    hw: Hardware<B>,
    /// Written by the tick interrupt
    ticks: &'a TickCounter,
    state: DeviceState,
    settings: Settings,
    /// Skin class under selection and the session SPF
    profile: ExposureProfile,
    budget: BurnBudget,
    /// Whole minutes in the current session
    running_minutes: u16,
    supply_centivolts: u16,
    /// Reused when a sensor read fails
    last_uv_index: f32,
}

impl<'a, B: Board> Device<'a, B> {
    pub fn new(hw: Hardware<B>, ticks: &'a TickCounter) -> Self {
        Self {
            hw,
            ticks,
            state: DeviceState::default(),
            settings: Settings::default(),
            profile: ExposureProfile::default(),
            budget: BurnBudget::default(),
            running_minutes: 0,
            supply_centivolts: 0,
            last_uv_index: 0.0,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn profile(&self) -> ExposureProfile {
        self.profile
    }

    pub fn budget(&self) -> BurnBudget {
        self.budget
    }

    pub fn running_minutes(&self) -> u16 {
        self.running_minutes
    }

    pub fn supply_centivolts(&self) -> u16 {
        self.supply_centivolts
    }

    /// Probe the sensor and load settings.
    ///
    /// A sensor that does not answer is fatal; the caller is expected to
    /// call [`Device::report_fault`] and halt.
    pub async fn boot(&mut self) -> Result<(), Error> {
        self.hw.power.gate_sensor(true);
        self.hw.clock.delay_ms(SENSOR_SETTLE_MS).await;
        let probe = self.hw.sensor.begin();
        self.hw.power.gate_sensor(false);
        probe?;

        self.settings = match Settings::load(&mut self.hw.store) {
            Ok(settings) => settings,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Settings store unusable ({}), using defaults", _e);
                Settings::default()
            }
        };

        #[cfg(feature = "defmt")]
        defmt::info!("Boot complete, skin class {}", self.settings.skin_class().get());

        self.state = DeviceState::Config;
        Ok(())
    }

    /// Play the fatal-error tone.
    pub async fn report_fault(&mut self) {
        feedback::play_note(&mut self.hw.tones, &mut self.hw.clock, feedback::ERROR).await;
        self.hw.tones.stop();
    }

    /// Run the current state to completion and take the resulting transition.
    pub async fn step(&mut self) -> DeviceState {
        let event = match self.state {
            DeviceState::PowerOff => self.power_off().await,
            DeviceState::Config => self.configure().await,
            DeviceState::Running => self.run_session().await,
            DeviceState::Completed => self.complete().await,
        };

        let next = self.state.transition(event);

        #[cfg(feature = "defmt")]
        defmt::info!("{} --{}--> {}", self.state, event, next);

        self.state = next;
        next
    }

    /// Drive the state machine forever.
    pub async fn run(&mut self) -> ! {
        loop {
            self.step().await;
        }
    }

    async fn power_off(&mut self) -> Event {
        self.hw.ticker.stop();
        self.hw.power.gate_sensor(false);
        self.running_minutes = 0;

        feedback::play_sequence(&mut self.hw.tones, &mut self.hw.clock, &feedback::SHUTDOWN).await;
        self.hw.tones.stop();

        // An edge from the release of the press that got us here must not
        // count as a wake
        self.wait_power_released().await;

        self.hw.power.arm_wake(true);
        loop {
            self.hw.power.enter_low_power().await;
            if self.wake_confirmed().await {
                break;
            }

            #[cfg(feature = "defmt")]
            defmt::debug!("Spurious wake, back to sleep");
        }
        self.hw.power.arm_wake(false);

        Event::Wake
    }

    async fn wait_power_released(&mut self) {
        loop {
            self.hw.buttons.update(Button::Power);
            if !self.hw.buttons.level(Button::Power).is_pressed() {
                return;
            }
            self.hw.clock.delay_ms(BUTTON_POLL_MS).await;
        }
    }

    /// Watch the power button for [`WAKE_CONFIRM_MS`] after a wake.
    ///
    /// Any enabled interrupt ends a sleep, so a wake only counts once the
    /// debounced level shows the button down.
    async fn wake_confirmed(&mut self) -> bool {
        let mut waited = 0;
        loop {
            self.hw.buttons.update(Button::Power);
            if self.hw.buttons.level(Button::Power).is_pressed() {
                return true;
            }
            if waited >= WAKE_CONFIRM_MS {
                return false;
            }
            self.hw.clock.delay_ms(BUTTON_POLL_MS).await;
            waited += BUTTON_POLL_MS;
        }
    }

    async fn configure(&mut self) -> Event {
        feedback::play_sequence(&mut self.hw.tones, &mut self.hw.clock, &feedback::STARTUP).await;

        self.profile = ExposureProfile::new(self.settings.skin_class(), SpfIndex::NONE);

        let mut trackers = [PressTracker::new(); 3];
        for button in Button::ALL {
            self.hw.buttons.update(button);
            trackers[button.index()].restart(self.hw.buttons.level(button));
        }

        let mut last_activity = self.hw.clock.now_ms();
        loop {
            let now = self.hw.clock.now_ms();

            for button in Button::ALL {
                if self.hw.buttons.update(button) {
                    last_activity = now;
                }
                let level = self.hw.buttons.level(button);

                match (button, trackers[button.index()].advance(level, now)) {
                    (Button::Skin, Some(Press::Short)) => self.cycle_skin().await,
                    (Button::Set, Some(Press::Short)) => self.cycle_spf().await,
                    (Button::Set, Some(Press::Long)) => {
                        self.commit().await;
                        return Event::Commit;
                    }
                    (Button::Power, Some(Press::Long)) => return Event::PowerHold,
                    _ => {}
                }
            }

            if now.saturating_sub(last_activity) >= CONFIG_INACTIVITY_MS {
                return Event::InactivityTimeout;
            }

            self.hw.clock.delay_ms(BUTTON_POLL_MS).await;
        }
    }

    async fn cycle_skin(&mut self) {
        let (skin, wrapped) = self.profile.skin.next();
        self.profile.skin = skin;
        let note = if wrapped {
            feedback::SKIN_WRAP
        } else {
            feedback::SKIN_STEP
        };
        feedback::play_note(&mut self.hw.tones, &mut self.hw.clock, note).await;
    }

    async fn cycle_spf(&mut self) {
        let (spf, wrapped) = self.profile.spf.next();
        self.profile.spf = spf;
        let note = if wrapped {
            feedback::SPF_WRAP
        } else {
            feedback::SPF_STEP
        };
        feedback::play_note(&mut self.hw.tones, &mut self.hw.clock, note).await;
    }

    /// Persist a changed skin class, read the choices back and arm the budget.
    async fn commit(&mut self) {
        match self
            .settings
            .update_skin_class(&mut self.hw.store, self.profile.skin)
        {
            Ok(true) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Skin class {} saved", self.profile.skin.get());
            }
            Ok(false) => {}
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Skin class not saved: {}", _e);
            }
        }

        let tones = &mut self.hw.tones;
        let clock = &mut self.hw.clock;
        feedback::play_count(tones, clock, self.profile.spf.get(), feedback::SPF_COUNT).await;
        clock.delay_ms(COUNT_BEEP_PAUSE_MS * 2).await;
        feedback::play_count(tones, clock, self.profile.skin.get(), feedback::SKIN_COUNT).await;
        clock.delay_ms(COUNT_BEEP_PAUSE_MS * 2).await;
        feedback::play_sequence(tones, clock, &feedback::SESSION_START).await;

        self.budget = self.profile.initial_budget();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Session: skin {} x SPF {} = {} min",
            self.profile.skin.get(),
            self.profile.spf_multiplier(),
            self.budget.minutes()
        );
    }

    async fn run_session(&mut self) -> Event {
        self.ticks.reset();
        self.hw.ticker.start();

        let event = loop {
            self.hw.power.enter_low_power().await;

            // Woken by something other than the minute rollover
            if !self.ticks.take_minute() {
                continue;
            }

            self.running_minutes += 1;
            if self.running_minutes >= SESSION_CEILING_MINUTES {
                break Event::SessionCeiling;
            }

            if self.power_held().await {
                break Event::PowerHold;
            }

            self.check_supply().await;

            let uv_index = self.sample_uv().await;
            self.budget.consume(uv_index);

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "Minute {}: UVI {}, {} min left",
                self.running_minutes,
                uv_index,
                self.budget.minutes()
            );

            if self.budget.is_exhausted() {
                break Event::BudgetExhausted;
            }
        };

        self.hw.ticker.stop();
        event
    }

    /// Time a power press in progress at the sampling point.
    async fn power_held(&mut self) -> bool {
        self.hw.buttons.update(Button::Power);
        if !self.hw.buttons.level(Button::Power).is_pressed() {
            return false;
        }

        let mut tracker = PressTracker::new();
        tracker.begin_press(self.hw.clock.now_ms());
        loop {
            self.hw.clock.delay_ms(BUTTON_POLL_MS).await;
            self.hw.buttons.update(Button::Power);
            let level = self.hw.buttons.level(Button::Power);
            match tracker.advance(level, self.hw.clock.now_ms()) {
                Some(Press::Long) => return true,
                Some(Press::Short) => return false,
                None => {}
            }
        }
    }

    async fn check_supply(&mut self) {
        self.supply_centivolts = self.hw.supply.read_supply_centivolts().await;
        if self.supply_centivolts < LOW_BATTERY_CENTIVOLTS {
            #[cfg(feature = "defmt")]
            defmt::warn!("Low battery: {} cV", self.supply_centivolts);
            feedback::play_sequence(&mut self.hw.tones, &mut self.hw.clock, &feedback::LOW_BATTERY)
                .await;
        } else {
            feedback::play_note(&mut self.hw.tones, &mut self.hw.clock, feedback::HEARTBEAT).await;
        }
    }

    async fn sample_uv(&mut self) -> f32 {
        self.hw.power.gate_sensor(true);
        self.hw.clock.delay_ms(SENSOR_SETTLE_MS).await;
        let reading = self.hw.sensor.read_uv_index_raw();
        self.hw.power.gate_sensor(false);

        match reading {
            Ok(raw) => self.last_uv_index = uv_index_from_raw(raw),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("UV read failed ({}), reusing last sample", _e);
            }
        }
        self.last_uv_index
    }

    async fn complete(&mut self) -> Event {
        let outcome = feedback::play_alarm(
            &mut self.hw.tones,
            &mut self.hw.clock,
            &mut self.hw.buttons,
            Button::Power,
        )
        .await;

        if outcome == AlarmOutcome::Acknowledged {
            #[cfg(feature = "defmt")]
            defmt::info!("Alarm acknowledged");
        }

        Event::AlarmFinished
    }
}
