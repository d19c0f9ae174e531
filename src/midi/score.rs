//! Standard MIDI File (SMF) decoding into a flat message stream.
//!
//! The voicing pipeline only needs three kinds of message, so decoding keeps
//! note-on, note-off and tempo changes and folds everything else into
//! [`MessageKind::Other`]. Other events are kept rather than dropped because
//! their delta-times still move the track clock forward.
//!
//! # Limitations
//!
//! - SMF Format 2 (sequential) files are rejected
//! - SMPTE timecode timing is rejected, since there is no ticks-per-quarter
//!   reference to convert ticks to seconds
//! - MIDI channels are ignored; all channels of a track form one stream

use crate::error::ScoreError;
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::fs;
use std::path::Path;

/// What a score message does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Note on. A velocity of 0 is a note-off by MIDI convention.
    NoteOn { pitch: u8, velocity: u8 },
    /// Explicit note off.
    NoteOff { pitch: u8, velocity: u8 },
    /// Set tempo, in microseconds per quarter note.
    Tempo(u32),
    /// Any other event. Only its delta-time matters.
    Other,
}

/// One message with its delta-time in ticks since the previous message of
/// the same track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMessage {
    pub delta: u32,
    pub kind: MessageKind,
}

impl ScoreMessage {
    pub fn new(delta: u32, kind: MessageKind) -> Self {
        Self { delta, kind }
    }

    pub fn note_on(delta: u32, pitch: u8, velocity: u8) -> Self {
        Self::new(delta, MessageKind::NoteOn { pitch, velocity })
    }

    pub fn note_off(delta: u32, pitch: u8) -> Self {
        Self::new(delta, MessageKind::NoteOff { pitch, velocity: 0 })
    }

    pub fn tempo(delta: u32, usec_per_quarter: u32) -> Self {
        Self::new(delta, MessageKind::Tempo(usec_per_quarter))
    }
}

/// An ordered message list with an optional display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTrack {
    pub name: Option<String>,
    pub messages: Vec<ScoreMessage>,
}

impl ScoreTrack {
    pub fn new(messages: Vec<ScoreMessage>) -> Self {
        Self {
            name: None,
            messages,
        }
    }

    /// Returns the track name, or a positional fallback.
    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Track {}", index + 1))
    }
}

/// A fully decoded score: tracks in file order plus the tick resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Ticks per quarter note.
    pub ticks_per_quarter: u16,
    pub tracks: Vec<ScoreTrack>,
}

impl Score {
    pub fn new(ticks_per_quarter: u16, tracks: Vec<ScoreTrack>) -> Self {
        Self {
            ticks_per_quarter,
            tracks,
        }
    }

    /// Reads and decodes a `.mid` file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a supported SMF
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoreError> {
        let data = fs::read(path.as_ref())?;
        Self::from_smf_bytes(&data)
    }

    /// Decodes an in-memory Standard MIDI File.
    pub fn from_smf_bytes(data: &[u8]) -> Result<Self, ScoreError> {
        let smf = Smf::parse(data).map_err(|e| ScoreError::Parse(e.to_string()))?;

        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) => tpq.as_int(),
            Timing::Timecode(_, _) => {
                return Err(ScoreError::UnsupportedTiming(
                    "SMPTE timecode timing not supported".to_string(),
                ))
            }
        };

        if smf.header.format == Format::Sequential {
            return Err(ScoreError::UnsupportedFormat(
                "Format 2 (sequential) MIDI files not supported".to_string(),
            ));
        }

        let tracks: Vec<ScoreTrack> = smf.tracks.iter().map(|t| decode_track(t)).collect();
        let score = Self::new(ticks_per_quarter, tracks);
        tracing::debug!(
            tracks = score.tracks.len(),
            messages = score.message_count(),
            ticks_per_quarter,
            "decoded standard MIDI file"
        );

        Ok(score)
    }

    /// Total number of messages across all tracks.
    pub fn message_count(&self) -> usize {
        self.tracks.iter().map(|t| t.messages.len()).sum()
    }
}

fn decode_track(events: &[TrackEvent]) -> ScoreTrack {
    let mut track = ScoreTrack::default();
    track.messages.reserve(events.len());

    for event in events {
        let delta = event.delta.as_int();
        let kind = match event.kind {
            TrackEventKind::Midi { message, .. } => match message {
                MidiMessage::NoteOn { key, vel } => MessageKind::NoteOn {
                    pitch: key.as_int(),
                    velocity: vel.as_int(),
                },
                MidiMessage::NoteOff { key, vel } => MessageKind::NoteOff {
                    pitch: key.as_int(),
                    velocity: vel.as_int(),
                },
                _ => MessageKind::Other,
            },
            TrackEventKind::Meta(MetaMessage::Tempo(usec_per_quarter)) => {
                MessageKind::Tempo(usec_per_quarter.as_int())
            }
            TrackEventKind::Meta(MetaMessage::TrackName(name_bytes)) => {
                if track.name.is_none() {
                    if let Ok(name) = std::str::from_utf8(name_bytes) {
                        track.name = Some(name.to_string());
                    }
                }
                MessageKind::Other
            }
            _ => MessageKind::Other,
        };
        track.messages.push(ScoreMessage::new(delta, kind));
    }

    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::Header;

    fn event(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind,
        }
    }

    fn encode(format: Format, timing: Timing, tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(format, timing));
        smf.tracks = tracks;
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_decodes_notes_tempo_and_names() {
        let bytes = encode(
            Format::Parallel,
            Timing::Metrical(u15::new(96)),
            vec![vec![
                event(0, TrackEventKind::Meta(MetaMessage::TrackName(&b"Lead"[..]))),
                event(0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(400_000)))),
                event(
                    10,
                    TrackEventKind::Midi {
                        channel: u4::new(2),
                        message: MidiMessage::NoteOn {
                            key: u7::new(64),
                            vel: u7::new(90),
                        },
                    },
                ),
                event(
                    96,
                    TrackEventKind::Midi {
                        channel: u4::new(2),
                        message: MidiMessage::NoteOff {
                            key: u7::new(64),
                            vel: u7::new(0),
                        },
                    },
                ),
                event(5, TrackEventKind::Meta(MetaMessage::EndOfTrack)),
            ]],
        );

        let score = Score::from_smf_bytes(&bytes).unwrap();
        assert_eq!(score.ticks_per_quarter, 96);
        assert_eq!(score.tracks.len(), 1);
        let track = &score.tracks[0];
        assert_eq!(track.name.as_deref(), Some("Lead"));
        assert_eq!(
            track.messages[..4],
            [
                ScoreMessage::new(0, MessageKind::Other),
                ScoreMessage::tempo(0, 400_000),
                ScoreMessage::note_on(10, 64, 90),
                ScoreMessage::note_off(96, 64),
            ]
        );
        assert!(score.message_count() >= 4);
    }

    #[test]
    fn test_rejects_timecode_timing() {
        let bytes = encode(
            Format::SingleTrack,
            Timing::Timecode(midly::Fps::Fps25, 40),
            vec![vec![event(0, TrackEventKind::Meta(MetaMessage::EndOfTrack))]],
        );
        assert!(matches!(
            Score::from_smf_bytes(&bytes),
            Err(ScoreError::UnsupportedTiming(_))
        ));
    }

    #[test]
    fn test_rejects_sequential_format() {
        let bytes = encode(
            Format::Sequential,
            Timing::Metrical(u15::new(480)),
            vec![vec![event(0, TrackEventKind::Meta(MetaMessage::EndOfTrack))]],
        );
        assert!(matches!(
            Score::from_smf_bytes(&bytes),
            Err(ScoreError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Score::from_smf_bytes(b"not a midi file"),
            Err(ScoreError::Parse(_))
        ));
    }

    #[test]
    fn test_display_name_fallback() {
        let track = ScoreTrack::new(Vec::new());
        assert_eq!(track.display_name(2), "Track 3");
    }
}
