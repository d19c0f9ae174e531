//! Closed note intervals.

use serde::{Deserialize, Serialize};

/// A single sounding note: one pitch held from `onset` up to `offset`.
///
/// Produced by the extractor once both ends are known and never mutated
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number (0-127).
    pub pitch: u8,

    /// Tick at which the note starts.
    pub onset: u32,

    /// Tick at which the note stops. Never earlier than `onset`.
    pub offset: u32,
}

impl NoteEvent {
    /// Creates a closed interval, clamping the pitch into MIDI range and the
    /// offset so it never precedes the onset.
    pub fn new(pitch: u8, onset: u32, offset: u32) -> Self {
        Self {
            pitch: pitch.min(127),
            onset,
            offset: offset.max(onset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = NoteEvent::new(60, 0, 480);
        assert_eq!(note.pitch, 60);
        assert_eq!((note.onset, note.offset), (0, 480));
    }

    #[test]
    fn test_note_clamping() {
        let note = NoteEvent::new(200, 500, 100);
        assert_eq!(note.pitch, 127);
        assert_eq!(note.offset, 500);
    }
}
