//! Sleep/wake control and sensor power gating.
//!
//! The MCU spends nearly all of its life in STOP mode. Two interrupts can
//! bring it back:
//!
//! - **EXTI line 0** (PA0, power button, falling edge): armed only while
//!   the device is powered off.
//! - **LPTIM1** (EXTI line 29): the periodic tick, see [`crate::tick`].
//!
//! Both handlers signal [`WAKE_SIGNAL`]. The controller does not care which
//! one fired; it rechecks its own state after every wake.
//!
//! # Hardware Design
//!
//! The SI1145 is fed through a load switch on PB1 (SENSOR_EN, active-high)
//! so it draws nothing between samples. The ADC is disabled and VREFINT
//! switched off before every STOP entry, and restored afterwards.

use cortex_m::peripheral::SCB;
use embassy_stm32::{gpio::Output, pac};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use pac::interrupt;
use sunguard_core::traits::PowerControl;

/// EXTI line for PA0
const POWER_BUTTON_EXTI_LINE: usize = 0;

/// IMR register index (lines 0-31 are in IMR1)
const IMR1_REG_IDX: usize = 0;

/// Raised by every interrupt that should end a STOP period.
pub static WAKE_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Power-button interrupt handler (EXTI lines 0 and 1).
///
/// Clears the pending flag and wakes whoever is sleeping. The button
/// itself is read back through the debounced inputs.
#[interrupt]
fn EXTI0_1() {
    let exti = pac::EXTI;

    exti.pr(IMR1_REG_IDX)
        .modify(|w| w.set_line(POWER_BUTTON_EXTI_LINE, true));

    WAKE_SIGNAL.signal(());
}

/// Configures EXTI line 0 for a falling edge on PA0 and unmasks the
/// interrupt in the NVIC.
///
/// The line itself stays masked until [`PowerController::arm_wake`].
/// SYSCFG_EXTICR1 resets to port A, so no port selection is needed.
pub fn setup_wake_exti() {
    let exti = pac::EXTI;

    exti.imr(IMR1_REG_IDX)
        .modify(|w| w.set_line(POWER_BUTTON_EXTI_LINE, false));
    exti.ftsr(IMR1_REG_IDX)
        .modify(|w| w.set_line(POWER_BUTTON_EXTI_LINE, true));
    exti.rtsr(IMR1_REG_IDX)
        .modify(|w| w.set_line(POWER_BUTTON_EXTI_LINE, false));

    unsafe {
        cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::EXTI0_1);
    };
}

/// ADC state saved across a STOP period
struct AdcContext {
    ccr: pac::adc::regs::Ccr,
    enabled: bool,
}

/// Turns the ADC and its voltage reference off, remembering how they were.
fn suspend_adc() -> AdcContext {
    let adc = pac::ADC1;

    let ccr = adc.ccr().read();
    let enabled = adc.cr().read().aden();

    if enabled {
        adc.cr().modify(|w| w.set_addis(true));
        while adc.cr().read().aden() {}
    }
    adc.ccr().modify(|w| w.set_vrefen(false));

    AdcContext { ccr, enabled }
}

fn resume_adc(ctx: AdcContext) {
    let adc = pac::ADC1;

    adc.ccr().write_value(ctx.ccr);

    if ctx.enabled {
        adc.isr().write(|w| w.set_adrdy(true));
        adc.cr().modify(|w| w.set_aden(true));
        while !adc.isr().read().adrdy() {}
    }
}

/// Owns the sensor supply switch and the core's sleep control.
pub struct PowerController {
    /// Active-high enable for the sensor load switch (PB1)
    sensor_en: Output<'static>,
    /// Needed to toggle SLEEPDEEP
    scb: SCB,
}

impl PowerController {
    /// Creates a new PowerController.
    ///
    /// # Arguments
    ///
    /// * `sensor_en` - Sensor supply enable (PB1), expected low
    /// * `scb` - Core system control block
    pub fn new(sensor_en: Output<'static>, scb: SCB) -> Self {
        let pwr = pac::PWR;

        // STOP rather than STANDBY, regulator in low-power mode, VREFINT
        // off while stopped
        pac::RCC.apb1enr().modify(|w| w.set_pwren(true));
        pwr.cr().modify(|w| {
            w.set_pdds(pac::pwr::vals::Pdds::STOP_MODE);
            w.set_lpsdsr(pac::pwr::vals::Mode::LOW_POWER_MODE);
            w.set_ulp(true);
        });

        Self { sensor_en, scb }
    }
}

impl PowerControl for PowerController {
    async fn enter_low_power(&mut self) {
        let adc = suspend_adc();

        // Stale wake-up flag would abort the next STOP entry
        pac::PWR.cr().modify(|w| w.set_cwuf(true));
        self.scb.set_sleepdeep();

        #[cfg(feature = "debug-mode")]
        defmt::info!("Entering STOP");

        // The executor's idle WFE drops into STOP from here
        WAKE_SIGNAL.wait().await;

        self.scb.clear_sleepdeep();
        resume_adc(adc);
    }

    fn gate_sensor(&mut self, on: bool) {
        if on {
            self.sensor_en.set_high();
        } else {
            self.sensor_en.set_low();
        }
    }

    fn arm_wake(&mut self, armed: bool) {
        let exti = pac::EXTI;

        if armed {
            // Drop an edge left over from the last press
            exti.pr(IMR1_REG_IDX)
                .modify(|w| w.set_line(POWER_BUTTON_EXTI_LINE, true));
            WAKE_SIGNAL.reset();
        }

        exti.imr(IMR1_REG_IDX)
            .modify(|w| w.set_line(POWER_BUTTON_EXTI_LINE, armed));
    }
}
