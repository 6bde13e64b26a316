//! Periodic tick from LPTIM1.
//!
//! LPTIM1 runs from the 32.768 kHz LSE, so it keeps counting in STOP mode.
//! With a /128 prescaler one count is 3.90625 ms and an autoreload of 1023
//! gives exactly one interrupt every 4 s (15 per minute).
//!
//! The interrupt handler bumps [`TICKS`] and wakes the controller through
//! [`WAKE_SIGNAL`](crate::power::WAKE_SIGNAL).

use embassy_stm32::pac;
use pac::interrupt;
use sunguard_core::config::TICK_PERIOD_MS;
use sunguard_core::tick::TickCounter;
use sunguard_core::traits::TickSource;

use crate::power::WAKE_SIGNAL;

/// LSE frequency
const LSE_HZ: u32 = 32_768;

/// LPTIM1 clock divider
const PRESCALER: u32 = 128;

/// Autoreload for one tick period
const AUTORELOAD: u16 = (LSE_HZ / PRESCALER * TICK_PERIOD_MS / 1_000 - 1) as u16;

/// EXTI line for the LPTIM1 wake-up event
const LPTIM1_EXTI_LINE: usize = 29;

/// IMR register index (lines 0-31 are in IMR1)
const IMR1_REG_IDX: usize = 0;

/// Ticks counted by the interrupt, read by the controller.
pub static TICKS: TickCounter = TickCounter::new();

/// LPTIM1 interrupt handler.
///
/// Fires on every autoreload match.
#[interrupt]
fn LPTIM1() {
    pac::LPTIM1.icr().write(|w| w.set_arrmcf(true));

    TICKS.on_tick();
    WAKE_SIGNAL.signal(());
}

/// Starts and stops LPTIM1.
pub struct LptimTicker {
    _private: (),
}

impl LptimTicker {
    /// Clocks LPTIM1 from the LSE, routes its wake-up line and unmasks the
    /// interrupt. The timer itself is left disabled.
    pub fn new() -> Self {
        let rcc = pac::RCC;
        let exti = pac::EXTI;

        rcc.ccipr()
            .modify(|w| w.set_lptim1sel(pac::rcc::vals::Lptimsel::LSE));
        rcc.apb1enr().modify(|w| w.set_lptim1en(true));

        // CFGR and IER may only be written while the timer is disabled
        let lptim = pac::LPTIM1;
        lptim.cr().write(|w| w.set_enable(false));
        lptim
            .cfgr()
            .write(|w| w.set_presc(pac::lptim::vals::Presc::DIV128));
        lptim.ier().write(|w| w.set_arrmie(true));

        exti.imr(IMR1_REG_IDX)
            .modify(|w| w.set_line(LPTIM1_EXTI_LINE, true));

        unsafe {
            cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::LPTIM1);
        };

        Self { _private: () }
    }
}

impl TickSource for LptimTicker {
    fn start(&mut self) {
        let lptim = pac::LPTIM1;

        lptim.cr().write(|w| w.set_enable(true));
        // ARR is only writable once enabled
        lptim.arr().write(|w| w.set_arr(AUTORELOAD));
        while !lptim.isr().read().arrok() {}
        lptim.icr().write(|w| w.set_arrokcf(true));
        lptim.cr().write(|w| {
            w.set_enable(true);
            w.set_cntstrt(true);
        });

        #[cfg(feature = "debug-mode")]
        defmt::info!("Tick started, ARR {}", AUTORELOAD);
    }

    fn stop(&mut self) {
        let lptim = pac::LPTIM1;

        lptim.cr().write(|w| w.set_enable(false));
        lptim.icr().write(|w| w.set_arrmcf(true));
    }
}
