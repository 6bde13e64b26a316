//! Error types shared by the core and the board drivers

/// Failures reported by collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// UV sensor did not answer or reported the wrong part id at boot
    SensorInit,
    /// Bus transfer with the UV sensor failed after initialisation
    SensorBus,
    /// Persistent byte store rejected a write
    Storage,
}
