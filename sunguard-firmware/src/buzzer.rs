//! Piezo buzzer on TIM2 channel 1 (PA5).

use embassy_stm32::peripherals::TIM2;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_time::Timer;
use sunguard_core::traits::ToneGenerator;

/// Square wave
const DUTY_PERCENT: u8 = 50;

/// Drives the piezo with a square wave at the requested frequency.
pub struct Buzzer {
    pwm: SimplePwm<'static, TIM2>,
}

impl Buzzer {
    pub fn new(mut pwm: SimplePwm<'static, TIM2>) -> Self {
        pwm.ch1().disable();
        Self { pwm }
    }
}

impl ToneGenerator for Buzzer {
    async fn play(&mut self, frequency_hz: u32, duration_ms: u32, overlap: bool) {
        self.pwm.set_frequency(Hertz(frequency_hz));

        let mut ch = self.pwm.ch1();
        // Duty is relative to ARR, which set_frequency just changed
        ch.set_duty_cycle_percent(DUTY_PERCENT);
        ch.enable();

        if !overlap {
            Timer::after_millis(duration_ms as u64).await;
            self.pwm.ch1().disable();
        }
    }

    fn stop(&mut self) {
        self.pwm.ch1().disable();
    }
}
