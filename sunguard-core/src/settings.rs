//! Persisted settings
//!
//! Three bytes at fixed addresses: two checkbytes that mark the store as
//! initialised, then the skin class. A checkbyte mismatch means the store
//! has never been written and gets seeded with defaults.

use crate::error::Error;
use crate::exposure::SkinClass;
use crate::traits::ByteStore;

pub const CHECKBYTE_A_ADDR: u16 = 0;
pub const CHECKBYTE_B_ADDR: u16 = 1;
pub const SKIN_CLASS_ADDR: u16 = 2;

pub const CHECKBYTE_A: u8 = 0x5A;
pub const CHECKBYTE_B: u8 = 0xC3;

/// In-RAM copy of the persisted settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    skin: SkinClass,
}

impl Settings {
    /// Read the settings, seeding defaults on first boot.
    pub fn load<S: ByteStore>(store: &mut S) -> Result<Self, Error> {
        let initialised = store.read_byte(CHECKBYTE_A_ADDR) == CHECKBYTE_A
            && store.read_byte(CHECKBYTE_B_ADDR) == CHECKBYTE_B;

        if !initialised {
            #[cfg(feature = "defmt")]
            defmt::info!("Settings store uninitialised, seeding defaults");
            return Self::seed(store);
        }

        match SkinClass::new(store.read_byte(SKIN_CLASS_ADDR)) {
            Some(skin) => Ok(Self { skin }),
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Stored skin class out of range, reseeding");
                Self::seed(store)
            }
        }
    }

    /// Write defaults. The skin byte goes first so an interrupted seed is
    /// retried on the next boot.
    fn seed<S: ByteStore>(store: &mut S) -> Result<Self, Error> {
        let settings = Self::default();
        store.write_byte(SKIN_CLASS_ADDR, settings.skin.get())?;
        store.write_byte(CHECKBYTE_A_ADDR, CHECKBYTE_A)?;
        store.write_byte(CHECKBYTE_B_ADDR, CHECKBYTE_B)?;
        Ok(settings)
    }

    pub fn skin_class(&self) -> SkinClass {
        self.skin
    }

    /// Persist `skin` if it differs from the stored class.
    ///
    /// Returns `true` if a write happened. The cached value is updated
    /// even when the write fails so the session uses the user's choice.
    pub fn update_skin_class<S: ByteStore>(
        &mut self,
        store: &mut S,
        skin: SkinClass,
    ) -> Result<bool, Error> {
        if skin == self.skin {
            return Ok(false);
        }
        self.skin = skin;
        store.write_byte(SKIN_CLASS_ADDR, skin.get())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryStore;

    #[test]
    fn test_first_boot_seeds_defaults() {
        let mut store = MemoryStore::blank();
        let settings = Settings::load(&mut store).unwrap();

        assert_eq!(settings.skin_class(), SkinClass::MOST_SENSITIVE);
        assert_eq!(store.bytes[CHECKBYTE_A_ADDR as usize], CHECKBYTE_A);
        assert_eq!(store.bytes[CHECKBYTE_B_ADDR as usize], CHECKBYTE_B);
        assert_eq!(store.bytes[SKIN_CLASS_ADDR as usize], 1);
        assert_eq!(store.writes, 3);
    }

    #[test]
    fn test_initialised_store_is_read_without_writes() {
        let mut store = MemoryStore::with_skin_class(4);
        let settings = Settings::load(&mut store).unwrap();

        assert_eq!(settings.skin_class().get(), 4);
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_single_checkbyte_mismatch_reseeds() {
        let mut store = MemoryStore::with_skin_class(4);
        store.bytes[CHECKBYTE_B_ADDR as usize] = 0x00;
        let settings = Settings::load(&mut store).unwrap();

        assert_eq!(settings.skin_class(), SkinClass::MOST_SENSITIVE);
        assert_eq!(store.bytes[CHECKBYTE_B_ADDR as usize], CHECKBYTE_B);
    }

    #[test]
    fn test_corrupt_skin_byte_reseeds() {
        let mut store = MemoryStore::with_skin_class(0);
        let settings = Settings::load(&mut store).unwrap();

        assert_eq!(settings.skin_class(), SkinClass::MOST_SENSITIVE);
        assert_eq!(store.bytes[SKIN_CLASS_ADDR as usize], 1);
    }

    #[test]
    fn test_unchanged_skin_is_not_written() {
        let mut store = MemoryStore::with_skin_class(2);
        let mut settings = Settings::load(&mut store).unwrap();

        let written = settings
            .update_skin_class(&mut store, SkinClass::new(2).unwrap())
            .unwrap();
        assert!(!written);
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_changed_skin_is_written_once() {
        let mut store = MemoryStore::with_skin_class(2);
        let mut settings = Settings::load(&mut store).unwrap();

        let written = settings
            .update_skin_class(&mut store, SkinClass::new(5).unwrap())
            .unwrap();
        assert!(written);
        assert_eq!(store.writes, 1);
        assert_eq!(store.bytes[SKIN_CLASS_ADDR as usize], 5);
        assert_eq!(settings.skin_class().get(), 5);
    }

    #[test]
    fn test_failed_write_keeps_choice_in_ram() {
        let mut store = MemoryStore::with_skin_class(2);
        let mut settings = Settings::load(&mut store).unwrap();
        store.fail_writes = true;

        let result = settings.update_skin_class(&mut store, SkinClass::new(3).unwrap());
        assert_eq!(result, Err(Error::Storage));
        assert_eq!(settings.skin_class().get(), 3);
    }
}
