//! Interrupt-shared tick counter
//!
//! The tick interrupt handler is the only writer that increments the
//! counter; the control loop is the only reader and the only one that
//! resets it. Both sides go through a critical section so a read-and-reset
//! can never interleave with an increment.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use crate::config::TICKS_PER_MINUTE;

/// Counts tick interrupts until one minute has elapsed.
pub struct TickCounter {
    ticks: Mutex<CriticalSectionRawMutex, Cell<u8>>,
    threshold: u8,
}

impl TickCounter {
    /// Counter that reports a minute every [`TICKS_PER_MINUTE`] ticks.
    pub const fn new() -> Self {
        Self::with_threshold(TICKS_PER_MINUTE)
    }

    pub const fn with_threshold(threshold: u8) -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
            threshold,
        }
    }

    /// Record one tick. Called from the timer interrupt handler.
    ///
    /// Saturates at the threshold; extra ticks before the control loop
    /// catches up do not count towards the next minute.
    pub fn on_tick(&self) {
        self.ticks.lock(|ticks| {
            let value = ticks.get();
            if value < self.threshold {
                ticks.set(value + 1);
            }
        });
    }

    /// Returns `true` and resets the counter once a minute has elapsed.
    pub fn take_minute(&self) -> bool {
        self.ticks.lock(|ticks| {
            if ticks.get() >= self.threshold {
                ticks.set(0);
                true
            } else {
                false
            }
        })
    }

    pub fn reset(&self) {
        self.ticks.lock(|ticks| ticks.set(0));
    }

    #[cfg(test)]
    fn count(&self) -> u8 {
        self.ticks.lock(|ticks| ticks.get())
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
