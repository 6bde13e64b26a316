//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and builds the board
//! implementations of the controller's collaborator traits.
//!
//! # Pin Assignments
//!
//! ## Buttons (active-low, internal pull-ups)
//! - **PA0**: POWER - Power/acknowledge, also the EXTI0 wake source
//! - **PA1**: SKIN - Skin class select
//! - **PA4**: SET - SPF select / start session
//!
//! ## UV Sensor (SI1145)
//! - **PB1**: SENSOR_EN - Active-high load switch for the sensor supply
//! - **PB6**: I2C1_SCL
//! - **PB7**: I2C1_SDA
//!
//! ## Buzzer
//! - **PA5**: TIM2_CH1 - Piezo drive
//!
//! ## Low Power & LPTIM
//! - **PC14**: OSC32_IN - 32.768 kHz crystal input
//! - **PC15**: OSC32_OUT - 32.768 kHz crystal output
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use cortex_m::peripheral::SCB;
use embassy_stm32::{
    adc::{self, Adc, SampleTime},
    bind_interrupts,
    gpio::{Input, Level, Output, OutputType, Pull, Speed},
    i2c::{self, I2c},
    mode::Blocking,
    peripherals::ADC1,
    time::Hertz,
    timer::{
        low_level::CountingMode,
        simple_pwm::{PwmPin, SimplePwm},
    },
};
use sunguard_core::device::{Board, Hardware};

use crate::buttons::ButtonPanel;
use crate::buzzer::Buzzer;
use crate::clock::EmbassyClock;
use crate::eeprom::DataEeprom;
use crate::power::PowerController;
use crate::si1145::Si1145;
use crate::supply::SupplySampler;
use crate::tick::LptimTicker;

bind_interrupts!(struct Irqs {
    ADC1_COMP => adc::InterruptHandler<ADC1>;
});

/// I2C bus speed for the SI1145
const I2C_FREQUENCY_KHZ: u32 = 100;

/// PWM frequency before the first note is played
const BUZZER_IDLE_KHZ: u32 = 2;

/// Collaborator types for the SunGuard board
pub struct Stm32Board;

impl Board for Stm32Board {
    type Sensor = Si1145<I2c<'static, Blocking, i2c::Master>>;
    type Tones = Buzzer;
    type Buttons = ButtonPanel;
    type Store = DataEeprom;
    type Supply = SupplySampler;
    type Power = PowerController;
    type Ticker = LptimTicker;
    type Clock = EmbassyClock;
}

/// Initializes all peripherals from the STM32 peripheral singleton.
///
/// # Initial GPIO States
///
/// - PB1 (SENSOR_EN): Low (sensor unpowered)
/// - PA0, PA1, PA4: Inputs with pull-up
///
/// # Arguments
///
/// * `p` - STM32 peripheral singleton from embassy_stm32::init()
/// * `scb` - Core system control block, for STOP entry
pub fn init(p: embassy_stm32::Peripherals, scb: SCB) -> Hardware<Stm32Board> {
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = Hertz::khz(I2C_FREQUENCY_KHZ);
    let i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB7, i2c_config);

    let pwm = SimplePwm::new(
        p.TIM2,
        Some(PwmPin::new(p.PA5, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz::khz(BUZZER_IDLE_KHZ),
        CountingMode::EdgeAlignedUp,
    );

    let mut adc = Adc::new(p.ADC1, Irqs);
    adc.set_sample_time(SampleTime::CYCLES160_5);

    Hardware {
        sensor: Si1145::new(i2c),
        tones: Buzzer::new(pwm),
        buttons: ButtonPanel::new(
            Input::new(p.PA0, Pull::Up),
            Input::new(p.PA1, Pull::Up),
            Input::new(p.PA4, Pull::Up),
        ),
        store: DataEeprom::new(),
        supply: SupplySampler::new(adc),
        power: PowerController::new(Output::new(p.PB1, Level::Low, Speed::Low), scb),
        ticker: LptimTicker::new(),
        clock: EmbassyClock,
    }
}
