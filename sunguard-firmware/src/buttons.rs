//! Debounced push buttons.
//!
//! All three buttons are active-low with internal pull-ups. A level only
//! counts once it has been stable for [`DEBOUNCE_MS`].

use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Instant};
use sunguard_core::traits::{Button, Buttons, Level};

/// Required stable time before a level change is accepted
const DEBOUNCE_MS: u64 = 20;

struct Debounced {
    pin: Input<'static>,
    stable: Level,
    candidate: Level,
    since: Instant,
    last_sample: Instant,
}

impl Debounced {
    fn new(pin: Input<'static>) -> Self {
        let level = sample(&pin);
        let now = Instant::now();
        Self {
            pin,
            stable: level,
            candidate: level,
            since: now,
            last_sample: now,
        }
    }

    fn update(&mut self) -> bool {
        let now = Instant::now();
        let raw = sample(&self.pin);
        let stale = now.duration_since(self.last_sample) >= Duration::from_millis(DEBOUNCE_MS);
        self.last_sample = now;

        // Nobody looked at the pin for a while, so there is no bounce
        // history to wait out
        if stale {
            self.candidate = raw;
            self.since = now;
            let changed = raw != self.stable;
            self.stable = raw;
            return changed;
        }

        if raw != self.candidate {
            self.candidate = raw;
            self.since = now;
            return false;
        }

        if self.candidate != self.stable
            && now.duration_since(self.since) >= Duration::from_millis(DEBOUNCE_MS)
        {
            self.stable = self.candidate;
            return true;
        }

        false
    }
}

fn sample(pin: &Input<'static>) -> Level {
    if pin.is_low() { Level::Low } else { Level::High }
}

/// Power (PA0), skin (PA1) and set (PA4)
pub struct ButtonPanel {
    inputs: [Debounced; 3],
}

impl ButtonPanel {
    /// Inputs in [`Button::index`] order.
    pub fn new(power: Input<'static>, skin: Input<'static>, set: Input<'static>) -> Self {
        Self {
            inputs: [Debounced::new(power), Debounced::new(skin), Debounced::new(set)],
        }
    }
}

impl Buttons for ButtonPanel {
    fn update(&mut self, button: Button) -> bool {
        self.inputs[button.index()].update()
    }

    fn level(&self, button: Button) -> Level {
        self.inputs[button.index()].stable
    }
}
