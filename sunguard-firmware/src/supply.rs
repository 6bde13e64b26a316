//! Supply voltage from the internal reference.
//!
//! VDD is not wired to any pin, so it is derived from a conversion of
//! VREFINT against the factory calibration taken at 3.0 V:
//!
//! `VDD = 3.0 V * VREFINT_CAL / VREFINT_DATA`

use embassy_stm32::adc::Adc;
use embassy_stm32::peripherals::ADC1;
use sunguard_core::traits::SupplyMonitor;

/// VREFINT_CAL, 12-bit conversion at VDDA = 3.0 V
const VREFINT_CAL_ADDR: usize = 0x1FF8_0078;

/// Calibration supply in centivolts
const CAL_CENTIVOLTS: u32 = 300;

pub struct SupplySampler {
    adc: Adc<'static, ADC1>,
}

impl SupplySampler {
    pub fn new(adc: Adc<'static, ADC1>) -> Self {
        Self { adc }
    }
}

fn vrefint_cal() -> u16 {
    // SAFETY: factory calibration in system memory, always readable
    unsafe { core::ptr::read_volatile(VREFINT_CAL_ADDR as *const u16) }
}

impl SupplyMonitor for SupplySampler {
    async fn read_supply_centivolts(&mut self) -> u16 {
        let mut vref = self.adc.enable_vref();
        let sample = self.adc.read(&mut vref).await as u32;

        if sample == 0 {
            return 0;
        }

        let centivolts = CAL_CENTIVOLTS * vrefint_cal() as u32 / sample;

        #[cfg(feature = "debug-mode")]
        defmt::info!("VREFINT {} -> {} cV", sample, centivolts);

        centivolts.min(u16::MAX as u32) as u16
    }
}
