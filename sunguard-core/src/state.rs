//! Device state machine definition
//!
//! The controller decides *when* an event happens; this table alone decides
//! where it leads.

/// Device states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Asleep with only the power-button wake interrupt armed
    PowerOff,
    /// Choosing skin class and SPF
    #[default]
    Config,
    /// Counting down the burn budget once per minute
    Running,
    /// Budget exhausted, alarm sounding
    Completed,
}

/// Events that move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Power-button edge woke the device
    Wake,
    /// Set held in config mode: start a session
    Commit,
    /// No button edge for the whole config window
    InactivityTimeout,
    /// Power button long-pressed
    PowerHold,
    /// Burn budget reached zero
    BudgetExhausted,
    /// Session hit the battery-protection ceiling
    SessionCeiling,
    /// Alarm finished or was acknowledged
    AlarmFinished,
}

impl DeviceState {
    /// Check if the periodic tick interrupt should be running
    pub fn ticks_enabled(&self) -> bool {
        matches!(self, DeviceState::Running)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use DeviceState::*;
        use Event::*;

        match (self, event) {
            (PowerOff, Wake) => Config,

            (Config, Commit) => Running,
            (Config, InactivityTimeout) => PowerOff,
            (Config, PowerHold) => PowerOff,

            (Running, BudgetExhausted) => Completed,
            (Running, SessionCeiling) => PowerOff,
            (Running, PowerHold) => PowerOff,

            (Completed, AlarmFinished) => PowerOff,

            // Default: stay in current state
            _ => self,
        }
    }
}
