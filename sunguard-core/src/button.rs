//! Press classification
//!
//! Each button gets a small state machine that is advanced once per poll
//! with the debounced level and the current time:
//!
//! ```text
//! Idle ──press──▶ Pressed ──release < 1 s──▶ Idle      (Short)
//!                    │
//!                    └──held ≥ 1 s──▶ Held ──release──▶ Idle   (Long)
//! ```
//!
//! A long press is reported as soon as the threshold is crossed, not on
//! release. A button that is already down when tracking starts is held in
//! `Ignored` until it is released, so the press that woke the device never
//! counts as input.

use crate::config::LONG_PRESS_MS;
use crate::traits::Level;

/// Classified press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Idle,
    Pressed { since_ms: u64 },
    Held,
    Ignored,
}

/// Per-button press state machine
#[derive(Debug, Clone, Copy)]
pub struct PressTracker {
    state: PressState,
}

impl Default for PressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PressTracker {
    pub const fn new() -> Self {
        Self {
            state: PressState::Idle,
        }
    }

    /// Start tracking from `level`, ignoring a press already in progress.
    pub fn restart(&mut self, level: Level) {
        self.state = if level.is_pressed() {
            PressState::Ignored
        } else {
            PressState::Idle
        };
    }

    /// Start tracking a press that began at `now_ms`.
    pub fn begin_press(&mut self, now_ms: u64) {
        self.state = PressState::Pressed { since_ms: now_ms };
    }

    /// `true` while a press is being timed
    #[cfg(test)]
    fn is_timing(&self) -> bool {
        matches!(self.state, PressState::Pressed { .. })
    }

    /// Advance with the latest debounced level.
    pub fn advance(&mut self, level: Level, now_ms: u64) -> Option<Press> {
        let pressed = level.is_pressed();
        match self.state {
            PressState::Idle => {
                if pressed {
                    self.state = PressState::Pressed { since_ms: now_ms };
                }
                None
            }
            PressState::Pressed { since_ms } => {
                let held_ms = now_ms.saturating_sub(since_ms);
                if pressed {
                    if held_ms >= LONG_PRESS_MS {
                        self.state = PressState::Held;
                        Some(Press::Long)
                    } else {
                        None
                    }
                } else {
                    self.state = PressState::Idle;
                    if held_ms >= LONG_PRESS_MS {
                        Some(Press::Long)
                    } else {
                        Some(Press::Short)
                    }
                }
            }
            PressState::Held | PressState::Ignored => {
                if !pressed {
                    self.state = PressState::Idle;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_press() {
        let mut tracker = PressTracker::new();
        assert_eq!(tracker.advance(Level::Low, 100), None);
        assert!(tracker.is_timing());
        assert_eq!(tracker.advance(Level::Low, 900), None);
        assert_eq!(tracker.advance(Level::High, 1_099), Some(Press::Short));
        assert!(!tracker.is_timing());
    }

    #[test]
    fn test_long_press_reported_at_threshold() {
        let mut tracker = PressTracker::new();
        tracker.advance(Level::Low, 0);
        assert_eq!(tracker.advance(Level::Low, 999), None);
        assert_eq!(tracker.advance(Level::Low, 1_000), Some(Press::Long));
        // Still held: reported only once
        assert_eq!(tracker.advance(Level::Low, 5_000), None);
        assert_eq!(tracker.advance(Level::High, 5_010), None);
        assert_eq!(tracker.advance(Level::Low, 6_000), None);
        assert!(tracker.is_timing());
    }

    #[test]
    fn test_late_release_counts_as_long() {
        let mut tracker = PressTracker::new();
        tracker.advance(Level::Low, 0);
        assert_eq!(tracker.advance(Level::High, 1_500), Some(Press::Long));
    }

    #[test]
    fn test_restart_ignores_held_button() {
        let mut tracker = PressTracker::new();
        tracker.restart(Level::Low);
        assert_eq!(tracker.advance(Level::Low, 0), None);
        assert_eq!(tracker.advance(Level::Low, 3_000), None);
        assert_eq!(tracker.advance(Level::High, 3_010), None);
        tracker.advance(Level::Low, 4_000);
        assert_eq!(tracker.advance(Level::High, 4_200), Some(Press::Short));
    }

    #[test]
    fn test_begin_press() {
        let mut tracker = PressTracker::new();
        tracker.begin_press(500);
        assert_eq!(tracker.advance(Level::Low, 1_500), Some(Press::Long));
    }
}
