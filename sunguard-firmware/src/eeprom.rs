//! Byte access to the STM32L0 data EEPROM.
//!
//! Reads are plain memory loads. Writes need the PECR unlock sequence and
//! complete in about 3.2 ms, during which the CPU busy-waits on BSY.

use embassy_stm32::pac;
use sunguard_core::Error;
use sunguard_core::traits::ByteStore;

/// Start of data EEPROM in the memory map
const EEPROM_BASE: usize = 0x0808_0000;

/// STM32L031 data EEPROM size
const EEPROM_SIZE: u16 = 1024;

/// PEKEYR unlock sequence
const PEKEY1: u32 = 0x89AB_CDEF;
const PEKEY2: u32 = 0x0203_0405;

pub struct DataEeprom {
    _private: (),
}

impl DataEeprom {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn unlock(&mut self) {
        let flash = pac::FLASH;

        if flash.pecr().read().pelock() {
            flash.pekeyr().write_value(PEKEY1);
            flash.pekeyr().write_value(PEKEY2);
        }
    }

    fn lock(&mut self) {
        pac::FLASH.pecr().modify(|w| w.set_pelock(true));
    }

    fn wait_ready(&self) {
        while pac::FLASH.sr().read().bsy() {}
    }
}

impl ByteStore for DataEeprom {
    fn read_byte(&mut self, address: u16) -> u8 {
        if address >= EEPROM_SIZE {
            return 0xFF;
        }

        // SAFETY: inside the data EEPROM, which is always mapped and readable
        unsafe { core::ptr::read_volatile((EEPROM_BASE + address as usize) as *const u8) }
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Error> {
        if address >= EEPROM_SIZE {
            return Err(Error::Storage);
        }

        self.wait_ready();
        self.unlock();

        // SAFETY: PECR is unlocked and the address is inside the data EEPROM
        unsafe { core::ptr::write_volatile((EEPROM_BASE + address as usize) as *mut u8, value) };

        self.wait_ready();
        let sr = pac::FLASH.sr().read();
        self.lock();

        if sr.wrperr() || sr.sizerr() {
            #[cfg(feature = "debug-mode")]
            defmt::error!("EEPROM write to {} failed", address);
            return Err(Error::Storage);
        }

        Ok(())
    }
}
