//! Audio feedback
//!
//! The device has no display, so every user-visible event is a tone
//! sequence. Sequences are plain note tables played through the
//! [`ToneGenerator`]; nothing here keeps state between calls.

use crate::config::{
    ALARM_MAX_MS, ALARM_PAUSE_MS, BUTTON_POLL_MS, COUNT_BEEP_PAUSE_MS, NOTE_GAP_MS,
};
use crate::traits::{Button, Buttons, Clock, ToneGenerator};

/// A single tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl Note {
    pub const fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

/// Rising C-major arpeggio played when the device wakes up.
pub const STARTUP: [Note; 5] = [
    Note::new(523, 80),
    Note::new(659, 80),
    Note::new(784, 80),
    Note::new(988, 80),
    Note::new(1175, 80),
];

/// Mirror image of [`STARTUP`].
pub const SHUTDOWN: [Note; 5] = [
    Note::new(1175, 80),
    Note::new(988, 80),
    Note::new(784, 80),
    Note::new(659, 80),
    Note::new(523, 80),
];

/// Played once when a session begins counting down.
pub const SESSION_START: [Note; 6] = [
    Note::new(784, 60),
    Note::new(988, 60),
    Note::new(1175, 60),
    Note::new(784, 60),
    Note::new(988, 60),
    Note::new(1568, 200),
];

/// Per-minute heartbeat.
pub const HEARTBEAT: Note = Note::new(3000, 30);

/// Replaces the heartbeat when the supply is low.
pub const LOW_BATTERY: [Note; 2] = [Note::new(440, 150), Note::new(330, 300)];

/// Sensor failure at boot.
pub const ERROR: Note = Note::new(220, 1500);

pub const SKIN_STEP: Note = Note::new(1800, 60);
pub const SKIN_WRAP: Note = Note::new(1200, 200);
pub const SPF_STEP: Note = Note::new(2400, 60);
pub const SPF_WRAP: Note = Note::new(1600, 200);

/// Beep used to count out the chosen SPF index
pub const SPF_COUNT: Note = Note::new(2200, 100);
/// Beep used to count out the chosen skin class
pub const SKIN_COUNT: Note = Note::new(1500, 100);

const SWEEP_START_HZ: u32 = 1_000;
const SWEEP_END_HZ: u32 = 4_000;
const SWEEP_STEP_HZ: u32 = 100;
const SWEEP_STEP_MS: u32 = 10;

/// How an alarm playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmOutcome {
    Acknowledged,
    TimedOut,
}

/// Play one note and the articulation gap after it.
pub async fn play_note<T: ToneGenerator, C: Clock>(tones: &mut T, clock: &mut C, note: Note) {
    tones.play(note.frequency_hz, note.duration_ms, false).await;
    clock.delay_ms(NOTE_GAP_MS).await;
}

pub async fn play_sequence<T: ToneGenerator, C: Clock>(tones: &mut T, clock: &mut C, notes: &[Note]) {
    for &note in notes {
        play_note(tones, clock, note).await;
    }
}

/// Beep `count` times so the user can count a chosen value by ear.
pub async fn play_count<T: ToneGenerator, C: Clock>(
    tones: &mut T,
    clock: &mut C,
    count: u8,
    note: Note,
) {
    for i in 0..count {
        if i > 0 {
            clock.delay_ms(COUNT_BEEP_PAUSE_MS).await;
        }
        play_note(tones, clock, note).await;
    }
}

fn ack_seen<B: Buttons>(buttons: &mut B, ack: Button) -> bool {
    buttons.update(ack);
    buttons.level(ack).is_pressed()
}

/// Sweep upward repeatedly until `ack` is pressed or [`ALARM_MAX_MS`]
/// has passed.
///
/// `ack` is sampled throughout; a press ends playback at the next sweep
/// or pause boundary.
pub async fn play_alarm<T, C, B>(tones: &mut T, clock: &mut C, buttons: &mut B, ack: Button) -> AlarmOutcome
where
    T: ToneGenerator,
    C: Clock,
    B: Buttons,
{
    let start = clock.now_ms();
    let mut acknowledged = false;

    loop {
        if clock.now_ms().saturating_sub(start) >= ALARM_MAX_MS {
            return AlarmOutcome::TimedOut;
        }

        let mut frequency = SWEEP_START_HZ;
        while frequency <= SWEEP_END_HZ {
            tones.play(frequency, SWEEP_STEP_MS, true).await;
            clock.delay_ms(SWEEP_STEP_MS).await;
            acknowledged |= ack_seen(buttons, ack);
            frequency += SWEEP_STEP_HZ;
        }
        tones.stop();

        if acknowledged {
            return AlarmOutcome::Acknowledged;
        }

        let mut paused = 0;
        while paused < ALARM_PAUSE_MS {
            clock.delay_ms(BUTTON_POLL_MS).await;
            paused += BUTTON_POLL_MS;
            acknowledged |= ack_seen(buttons, ack);
        }

        if acknowledged {
            return AlarmOutcome::Acknowledged;
        }
    }
}
