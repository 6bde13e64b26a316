//! Firmware for the SunGuard UV exposure wearable.
//!
//! # Overview
//!
//! A coin-cell powered wristband that counts down how many minutes of sun
//! the wearer has left before burning:
//! - Skin class (1-6) and sunscreen SPF chosen with two buttons
//! - UV index sampled from an SI1145 once per minute
//! - Piezo feedback for every event, alarm when the budget runs out
//! - Ultra-low power operation using STM32L031G6 in STOP mode
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6U6 (Cortex-M0+, ultra-low-power)
//! - **Sensor**: SI1145 UV index sensor on I2C1, supply gated by PB1
//! - **Buzzer**: Piezo on TIM2 CH1
//! - **Buttons**: power, skin, set (active-low)
//! - **LSE**: 32.768 kHz crystal clocking LPTIM1 in STOP mode
//!
//! # Low Power Operation
//!
//! - MSI oscillator at 2.097 MHz, just enough for I2C and the buzzer
//! - The controller sets SLEEPDEEP before waiting, so the executor's idle
//!   WFE drops into STOP
//! - LPTIM1 wakes the MCU every 4 seconds while a session runs
//! - EXTI0 (power button) wakes the MCU from power-off
//!
//! # Module Organization
//!
//! - [`hardware`] - Pin mappings and board wiring
//! - [`power`] - STOP entry, wake interrupt and sensor gating
//! - [`tick`] - LPTIM1 tick source
//! - [`si1145`] - UV sensor driver
//! - [`buzzer`] - PWM tone generator
//! - [`buttons`] - Debounced inputs
//! - [`eeprom`] - Settings storage in data EEPROM
//! - [`supply`] - VDD measurement via VREFINT
//! - [`clock`] - Millisecond time base

#![no_std]
#![no_main]

mod buttons;
mod buzzer;
mod clock;
mod eeprom;
mod hardware;
mod power;
mod si1145;
mod supply;
mod tick;

use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    rcc::{LsConfig, LseConfig, mux::ClockMux},
    time::Hertz,
};
use sunguard_core::Device;
use {defmt_rtt as _, panic_probe as _};

use power::setup_wake_exti;
use tick::TICKS;

/// Creates a low-power clock configuration for STM32L031.
///
/// # Clock Settings
///
/// - **MSI**: 2.097 MHz
/// - **System clock**: MSI (no PLL)
/// - **LSE**: 32.768 kHz external crystal for LPTIM1
/// - **Voltage scale**: Range 1
///
/// MSI also comes back up at this range after STOP, so no reclocking is
/// needed on wake.
///
/// # Returns
///
/// Configured RCC settings for embassy-stm32 initialization
fn create_low_power_config() -> embassy_stm32::rcc::Config {
    embassy_stm32::rcc::Config {
        msi: Some(embassy_stm32::rcc::MSIRange::RANGE2M),
        hsi: false,
        hse: None,
        pll: None,
        sys: embassy_stm32::rcc::Sysclk::MSI,
        ahb_pre: embassy_stm32::rcc::AHBPrescaler::DIV1,
        apb1_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        apb2_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        ls: LsConfig {
            rtc: embassy_stm32::rcc::RtcClockSource::LSE,
            lsi: false,
            lse: Some(LseConfig {
                frequency: Hertz::hz(32768),
                mode: embassy_stm32::rcc::LseMode::Oscillator(embassy_stm32::rcc::LseDrive::Low),
            }),
        },
        voltage_scale: embassy_stm32::rcc::VoltageScale::RANGE1,
        mux: ClockMux::default(),
    }
}

/// Main entry point for SunGuard firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks for low power operation
/// 2. Initialize STM32 peripherals and the board drivers
/// 3. Setup the power-button wake interrupt
/// 4. Probe the UV sensor and load settings
/// 5. Hand control to the device state machine
///
/// A sensor that fails to answer at boot is fatal: the error tone plays
/// once and the MCU halts.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_low_power_config();

    let p = embassy_stm32::init(config);
    let core = cortex_m::Peripherals::take().unwrap();

    #[cfg(feature = "debug-mode")]
    defmt::info!("SunGuard firmware starting...");

    // Wait 3 seconds after boot to allow debugger connection
    // before entering STOP mode.
    #[cfg(feature = "debug-mode")]
    {
        defmt::info!("Waiting 3 seconds for debugger connection...");
        embassy_time::Timer::after_secs(3).await;
    }

    #[cfg(feature = "debug-mode")]
    defmt::info!("Initializing peripherals...");

    let hw = hardware::init(p, core.SCB);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Setting up wake interrupt...");

    setup_wake_exti();

    let mut device = Device::new(hw, &TICKS);

    if let Err(_e) = device.boot().await {
        #[cfg(feature = "debug-mode")]
        defmt::error!("Boot failed: {}", _e);

        device.report_fault().await;
        loop {
            cortex_m::asm::nop();
        }
    }

    #[cfg(feature = "debug-mode")]
    defmt::info!("Entering state machine loop...");

    device.run().await
}
