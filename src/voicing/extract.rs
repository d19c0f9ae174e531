//! Note interval extraction.
//!
//! Walks every track with its own running clock and pairs note-on/note-off
//! messages into closed [`NoteEvent`]s, grouped by pitch. The tempo is an
//! independent fold over the whole stream: the last tempo change wins, no
//! matter which track carries it.

use crate::config::{OverlapPolicy, VoicingConfig};
use crate::error::VoicingError;
use crate::midi::{MessageKind, NoteEvent, ScoreTrack, PITCH_COUNT};
use serde::{Deserialize, Serialize};

/// Closed note intervals for each of the 128 pitches.
///
/// Intervals of one pitch are kept in the order their note-on was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchIntervalTable {
    pitches: Vec<Vec<NoteEvent>>,
}

impl PitchIntervalTable {
    pub fn new() -> Self {
        Self {
            pitches: vec![Vec::new(); PITCH_COUNT],
        }
    }

    /// Appends a closed interval to its pitch's list.
    pub fn push(&mut self, note: NoteEvent) {
        self.pitches[note.pitch as usize].push(note);
    }

    pub fn intervals(&self, pitch: u8) -> &[NoteEvent] {
        self.pitches
            .get(pitch as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates all intervals, pitch-ascending and then in extraction order.
    pub fn iter(&self) -> impl Iterator<Item = &NoteEvent> {
        self.pitches.iter().flatten()
    }

    pub fn interval_count(&self) -> usize {
        self.pitches.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.iter().all(Vec::is_empty)
    }

    /// Latest offset of any interval, or None for an empty table.
    pub fn last_tick(&self) -> Option<u32> {
        self.iter().map(|n| n.offset).max()
    }
}

impl Default for PitchIntervalTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Repairs and oddities noticed while pairing note messages.
///
/// None of these reject the score; they tell the caller how much of the
/// result is a best-effort reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractReport {
    /// Intervals still open at end of stream and closed there.
    pub repaired_open: usize,
    /// Note-offs with no open interval for their pitch on their track.
    pub ignored_close: usize,
    /// Intervals cut short by a repeated note-on under [`OverlapPolicy::Retrigger`].
    pub retriggered: usize,
    /// Whether the stream had no tempo change and the default was used.
    pub default_tempo: bool,
}

/// Output of [`extract_intervals`].
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Microseconds per quarter note.
    pub tempo: u32,
    pub table: PitchIntervalTable,
    pub report: ExtractReport,
}

/// An interval whose note-off has not arrived yet.
#[derive(Debug, Clone, Copy)]
struct OpenNote {
    /// Position in the stream-wide open order, which fixes table order.
    slot: usize,
    pitch: u8,
}

/// Final tempo of the stream, or None if no track sets one.
pub fn final_tempo(tracks: &[ScoreTrack]) -> Option<u32> {
    tracks
        .iter()
        .flat_map(|track| track.messages.iter())
        .fold(None, |tempo, message| match message.kind {
            MessageKind::Tempo(usec_per_quarter) => Some(usec_per_quarter),
            _ => tempo,
        })
}

/// Pairs note messages into closed intervals and reads the tempo.
///
/// Each track restarts its clock at zero. Open intervals are tracked on a
/// per-(pitch, track) stack; a note-off pops the most recently opened one.
/// Note-offs with nothing to close are ignored. Anything still open after
/// the last track is closed at the latest clock value seen in any track.
///
/// # Errors
///
/// Returns [`VoicingError::NoPlayableNotes`] if no note interval was found.
pub fn extract_intervals(
    tracks: &[ScoreTrack],
    config: &VoicingConfig,
) -> Result<Extraction, VoicingError> {
    let mut report = ExtractReport::default();

    let tempo = match final_tempo(tracks) {
        Some(tempo) => tempo,
        None => {
            tracing::warn!(
                tempo = config.default_tempo,
                "score has no tempo change, using default"
            );
            report.default_tempo = true;
            config.default_tempo
        }
    };

    // Onset and (once known) offset of every interval in note-on order.
    let mut opened: Vec<(u8, u32, Option<u32>)> = Vec::new();
    let mut dangling: Vec<OpenNote> = Vec::new();
    let mut end_of_stream: u32 = 0;

    for (track_idx, track) in tracks.iter().enumerate() {
        let mut clock: u32 = 0;
        let mut stacks: Vec<Vec<OpenNote>> = vec![Vec::new(); PITCH_COUNT];

        for message in &track.messages {
            clock = clock.saturating_add(message.delta);

            match message.kind {
                MessageKind::NoteOn { pitch, velocity } if velocity > 0 => {
                    // same clamp as NoteEvent::new, so a stack holds one table pitch
                    let pitch = pitch.min(127);
                    let stack = &mut stacks[pitch as usize];
                    if config.overlap_policy == OverlapPolicy::Retrigger {
                        if let Some(open) = stack.pop() {
                            opened[open.slot].2 = Some(clock);
                            report.retriggered += 1;
                        }
                    }
                    stack.push(OpenNote {
                        slot: opened.len(),
                        pitch,
                    });
                    opened.push((pitch, clock, None));
                }
                MessageKind::NoteOn { pitch, .. } | MessageKind::NoteOff { pitch, .. } => {
                    match stacks[pitch.min(127) as usize].pop() {
                        Some(open) => opened[open.slot].2 = Some(clock),
                        None => {
                            tracing::debug!(
                                track = %track.display_name(track_idx),
                                pitch,
                                tick = clock,
                                "ignoring note-off with no open note"
                            );
                            report.ignored_close += 1;
                        }
                    }
                }
                MessageKind::Tempo(_) | MessageKind::Other => {}
            }
        }

        end_of_stream = end_of_stream.max(clock);
        dangling.extend(stacks.into_iter().flatten());
    }

    for open in &dangling {
        tracing::debug!(pitch = open.pitch, "closing unterminated note at end of stream");
        opened[open.slot].2 = Some(end_of_stream);
    }
    report.repaired_open = dangling.len();
    if report.repaired_open > 0 {
        tracing::warn!(
            count = report.repaired_open,
            tick = end_of_stream,
            "closed notes left open at end of stream"
        );
    }
    if report.ignored_close > 0 {
        tracing::warn!(count = report.ignored_close, "ignored unmatched note-offs");
    }

    let mut table = PitchIntervalTable::new();
    for (pitch, onset, offset) in opened {
        let offset = offset.ok_or_else(|| {
            VoicingError::InternalInvariant(format!(
                "interval for pitch {} at tick {} was never closed",
                pitch, onset
            ))
        })?;
        table.push(NoteEvent::new(pitch, onset, offset));
    }

    if table.is_empty() {
        return Err(VoicingError::NoPlayableNotes);
    }

    tracing::debug!(
        intervals = table.interval_count(),
        tempo,
        "extracted note intervals"
    );

    Ok(Extraction {
        tempo,
        table,
        report,
    })
}
