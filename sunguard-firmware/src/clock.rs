//! Millisecond time base from the embassy time driver.
//!
//! The driver timer halts in STOP, so this clock only measures time spent
//! awake. That is all the controller uses it for.

use embassy_time::{Instant, Timer};
use sunguard_core::traits::Clock;

pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn delay_ms(&mut self, ms: u32) {
        Timer::after_millis(ms as u64).await;
    }
}
