//! Score-side data structures.
//!
//! This module provides the message stream the voicing pipeline consumes,
//! the closed note intervals it produces, and the tick/pitch conversions
//! shared by both sides.

mod note;
mod score;

pub use note::NoteEvent;
pub use score::{MessageKind, Score, ScoreMessage, ScoreTrack};

/// Standard MIDI note names for display purposes.
/// Maps MIDI note number (0-127) to note name within an octave.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Number of distinct MIDI pitches.
pub const PITCH_COUNT: usize = 128;

/// MIDI's implied tempo when a file sets none: 120 BPM.
pub const DEFAULT_TEMPO_USEC: u32 = 500_000;

/// Converts a MIDI note number to a human-readable note name with octave.
///
/// # Examples
///
/// ```
/// use midivox::midi::note_to_name;
///
/// assert_eq!(note_to_name(60), "C4");
/// assert_eq!(note_to_name(57), "A3");
/// ```
pub fn note_to_name(note: u8) -> String {
    let octave = (note / 12) as i8 - 1; // MIDI octave convention
    let note_index = (note % 12) as usize;
    format!("{}{}", NOTE_NAMES[note_index], octave)
}

/// Converts a pitch to Hertz in twelve-tone equal temperament.
///
/// `reference_pitch` sounds at exactly `reference_hz`; every semitone away
/// from it scales the frequency by 2^(1/12).
///
/// # Examples
///
/// ```
/// use midivox::midi::pitch_to_hz;
///
/// assert_eq!(pitch_to_hz(69, 57, 220.0), 440.0);
/// ```
pub fn pitch_to_hz(pitch: u8, reference_pitch: u8, reference_hz: f64) -> f64 {
    let semitones = pitch as f64 - reference_pitch as f64;
    reference_hz * 2f64.powf(semitones / 12.0)
}

/// Converts ticks to seconds.
///
/// # Arguments
///
/// * `ticks` - Number of ticks
/// * `tempo` - Microseconds per quarter note
/// * `ticks_per_quarter` - The score's tick resolution
pub fn ticks_to_seconds(ticks: u32, tempo: u32, ticks_per_quarter: u16) -> f64 {
    if ticks_per_quarter == 0 {
        return 0.0;
    }
    let quarters = ticks as f64 / ticks_per_quarter as f64;
    quarters * tempo as f64 / 1_000_000.0
}
