//! Exposure model
//!
//! Tracks how many more minutes of UV exposure the wearer can take before
//! burning. One UV-index unit held for one minute is the unit of burn risk,
//! so each elapsed minute simply subtracts the latest UV index from the
//! budget.

/// Minutes of exposure at UVI 1 before burning, indexed by skin class.
///
/// Index 0 is a sentinel and never an active class.
pub const MINUTES_PER_UVI: [u16; 7] = [0, 67, 100, 200, 300, 400, 500];

/// SPF multipliers selectable in config mode, indexed by SPF index.
///
/// Index 0 is a sentinel and never an active index.
pub const SPF_MULTIPLIERS: [u8; 6] = [0, 1, 10, 15, 30, 45];

/// Budget for a fresh session: `MINUTES_PER_UVI[skin_class] * spf_multiplier`.
///
/// Returns 0 for the sentinel class and for classes outside the table.
pub fn initial_budget(skin_class: u8, spf_multiplier: u8) -> f32 {
    let per_uvi = MINUTES_PER_UVI
        .get(skin_class as usize)
        .copied()
        .unwrap_or(0);
    per_uvi as f32 * spf_multiplier as f32
}

/// One minute of exposure at `uv_index`. No floor clamp.
pub fn consume(budget: f32, uv_index: f32) -> f32 {
    budget - uv_index
}

/// Convert a sensor reading (UV index × 100) to a UV index.
pub fn uv_index_from_raw(raw: u16) -> f32 {
    raw as f32 / 100.0
}

/// Fitzpatrick-like skin sensitivity class, always within 1..=6
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SkinClass(u8);

impl SkinClass {
    /// Most UV-sensitive class, used when nothing has been stored yet.
    pub const MOST_SENSITIVE: SkinClass = SkinClass(1);
    pub const MAX: u8 = 6;

    /// Validate a raw class number
    pub fn new(class: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&class).then_some(Self(class))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn minutes_per_uvi(self) -> u16 {
        MINUTES_PER_UVI[self.0 as usize]
    }

    /// Next class in the 1..=6 cycle, and whether the cycle wrapped
    pub fn next(self) -> (Self, bool) {
        if self.0 >= Self::MAX {
            (Self(1), true)
        } else {
            (Self(self.0 + 1), false)
        }
    }
}

impl Default for SkinClass {
    fn default() -> Self {
        Self::MOST_SENSITIVE
    }
}

/// Position in the SPF table, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpfIndex(u8);

impl SpfIndex {
    /// No sunscreen (SPF 1), the index every config session starts from.
    pub const NONE: SpfIndex = SpfIndex(1);
    pub const MAX: u8 = (SPF_MULTIPLIERS.len() - 1) as u8;

    pub fn new(index: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&index).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn multiplier(self) -> u8 {
        SPF_MULTIPLIERS[self.0 as usize]
    }

    /// Next index in the 1..=5 cycle, and whether the cycle wrapped
    pub fn next(self) -> (Self, bool) {
        if self.0 >= Self::MAX {
            (Self(1), true)
        } else {
            (Self(self.0 + 1), false)
        }
    }
}

impl Default for SpfIndex {
    fn default() -> Self {
        Self::NONE
    }
}

/// Skin class and sunscreen chosen for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExposureProfile {
    pub skin: SkinClass,
    pub spf: SpfIndex,
}

impl ExposureProfile {
    pub fn new(skin: SkinClass, spf: SpfIndex) -> Self {
        Self { skin, spf }
    }

    pub fn spf_multiplier(&self) -> u8 {
        self.spf.multiplier()
    }

    pub fn initial_budget(&self) -> BurnBudget {
        BurnBudget::from_minutes(initial_budget(self.skin.get(), self.spf_multiplier()))
    }
}

/// Remaining minutes-to-burn for the running session
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BurnBudget {
    minutes: f32,
}

impl BurnBudget {
    pub fn from_minutes(minutes: f32) -> Self {
        Self { minutes }
    }

    pub fn minutes(&self) -> f32 {
        self.minutes
    }

    /// Subtract one minute of exposure at `uv_index`
    pub fn consume(&mut self, uv_index: f32) {
        self.minutes = consume(self.minutes, uv_index);
    }

    /// Zero and below both end the session.
    pub fn is_exhausted(&self) -> bool {
        self.minutes <= 0.0
    }
}
