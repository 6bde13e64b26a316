//! Compile-time device configuration
//!
//! All timings are in milliseconds unless the name says otherwise.

// ---------------------------------------------------------------------------
// Tick source
// ---------------------------------------------------------------------------

/// Period of the hardware tick interrupt.
pub const TICK_PERIOD_MS: u32 = 4_000;

/// Tick interrupts per elapsed minute.
pub const TICKS_PER_MINUTE: u8 = (60_000 / TICK_PERIOD_MS) as u8;

// ---------------------------------------------------------------------------
// Running session
// ---------------------------------------------------------------------------

/// Battery-protection ceiling on a single session (12 hours).
pub const SESSION_CEILING_MINUTES: u16 = 720;

/// Sensor supply settle time after gating power on.
pub const SENSOR_SETTLE_MS: u32 = 200;

/// Supply voltage below which the low-battery tone replaces the heartbeat,
/// in centivolts.
pub const LOW_BATTERY_CENTIVOLTS: u16 = 270;

// ---------------------------------------------------------------------------
// User input
// ---------------------------------------------------------------------------

/// Hold time separating a short press from a long press.
pub const LONG_PRESS_MS: u64 = 1_000;

/// Config mode gives up after this long without a button edge.
pub const CONFIG_INACTIVITY_MS: u64 = 30_000;

/// Button poll interval while the controller is awake.
pub const BUTTON_POLL_MS: u32 = 10;

/// How long the power button is watched after a wake from power-off
/// before the wake is written off as spurious.
pub const WAKE_CONFIRM_MS: u32 = 50;

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Upper bound on a single alarm playback.
pub const ALARM_MAX_MS: u64 = 15_000;

/// Silence between two alarm sweeps.
pub const ALARM_PAUSE_MS: u32 = 400;

/// Silence between beeps of a count sequence.
pub const COUNT_BEEP_PAUSE_MS: u32 = 250;

/// Articulation gap after every non-overlapping note.
pub const NOTE_GAP_MS: u32 = 20;
