//! SI1145 UV index sensor over I2C.
//!
//! The sensor loses its configuration whenever the supply is gated off,
//! so every read starts with a reset and a full reconfiguration. The
//! driver is generic over the embedded-hal blocking I2C traits.

use embassy_time::{Duration, block_for};
use embedded_hal::blocking::i2c::{Write, WriteRead};
use sunguard_core::Error;
use sunguard_core::traits::UvSensor;

/// 7-bit bus address
pub const ADDRESS: u8 = 0x60;

/// Value of PART_ID for the SI1145
const PART_ID_SI1145: u8 = 0x45;

mod reg {
    pub const PART_ID: u8 = 0x00;
    pub const HW_KEY: u8 = 0x07;
    pub const UCOEF0: u8 = 0x13;
    pub const PARAM_WR: u8 = 0x17;
    pub const COMMAND: u8 = 0x18;
    pub const RESPONSE: u8 = 0x20;
    pub const UVINDEX0: u8 = 0x2C;
}

mod cmd {
    pub const RESET: u8 = 0x01;
    pub const ALS_FORCE: u8 = 0x06;
    pub const PARAM_SET: u8 = 0xA0;
}

/// Parameter RAM: channel list
const PARAM_CHLIST: u8 = 0x01;
const CHLIST_EN_UV: u8 = 0x80;

/// Must be written to HW_KEY before the device will run
const HW_KEY_VALUE: u8 = 0x17;

/// Default UV coefficients from the datasheet
const UCOEF: [u8; 4] = [0x7B, 0x6B, 0x01, 0x00];

/// Reset settle time
const RESET_MS: u64 = 10;

/// Forced ALS/UV conversion time
const CONVERSION_MS: u64 = 5;

pub struct Si1145<I> {
    i2c: I,
}

impl<I, E> Si1145<I>
where
    I: Write<Error = E> + WriteRead<Error = E>,
{
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        self.i2c
            .write(ADDRESS, &[reg, value])
            .map_err(|_| Error::SensorBus)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[reg], &mut buf)
            .map_err(|_| Error::SensorBus)?;
        Ok(buf[0])
    }

    /// Write a parameter RAM location through the command register.
    fn set_param(&mut self, param: u8, value: u8) -> Result<(), Error> {
        self.write_reg(reg::PARAM_WR, value)?;
        self.write_reg(reg::COMMAND, cmd::PARAM_SET | param)
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.write_reg(reg::COMMAND, cmd::RESET)?;
        block_for(Duration::from_millis(RESET_MS));
        self.write_reg(reg::HW_KEY, HW_KEY_VALUE)
    }

    fn configure(&mut self) -> Result<(), Error> {
        self.reset()?;

        for (i, &coef) in UCOEF.iter().enumerate() {
            self.write_reg(reg::UCOEF0 + i as u8, coef)?;
        }
        self.set_param(PARAM_CHLIST, CHLIST_EN_UV)
    }
}

impl<I, E> UvSensor for Si1145<I>
where
    I: Write<Error = E> + WriteRead<Error = E>,
{
    fn begin(&mut self) -> Result<(), Error> {
        let part_id = self.read_reg(reg::PART_ID).map_err(|_| Error::SensorInit)?;
        if part_id != PART_ID_SI1145 {
            #[cfg(feature = "debug-mode")]
            defmt::error!("Unexpected SI1145 part id {:#x}", part_id);
            return Err(Error::SensorInit);
        }

        self.configure().map_err(|_| Error::SensorInit)
    }

    fn read_uv_index_raw(&mut self) -> Result<u16, Error> {
        self.configure()?;

        self.write_reg(reg::COMMAND, cmd::ALS_FORCE)?;
        block_for(Duration::from_millis(CONVERSION_MS));

        // Nonzero high bits flag an overflow or invalid command
        if self.read_reg(reg::RESPONSE)? & 0xF0 != 0 {
            return Err(Error::SensorBus);
        }

        let mut buf = [0u8; 2];
        self.i2c
            .write_read(ADDRESS, &[reg::UVINDEX0], &mut buf)
            .map_err(|_| Error::SensorBus)?;

        Ok(u16::from_le_bytes(buf))
    }
}
