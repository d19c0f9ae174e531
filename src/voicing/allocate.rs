//! First-fit voice allocation.
//!
//! Notes are visited pitch-ascending, then in extraction order, and each one
//! goes into the first lane whose blocks are silent over the note's whole
//! range. When no lane fits, a new one is appended. This is a greedy
//! colouring of the interval graph: deterministic for a given score, but not
//! guaranteed to use the fewest possible lanes.

use super::cutoffs::CutoffSet;
use super::extract::PitchIntervalTable;
use crate::error::VoicingError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A monophonic voice: one optional pitch per block.
///
/// `None` marks a silent block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceLane {
    slots: Vec<Option<u8>>,
}

impl VoiceLane {
    /// Creates a lane that is silent over `blocks` blocks.
    pub fn new(blocks: usize) -> Self {
        Self {
            slots: vec![None; blocks],
        }
    }

    pub fn slots(&self) -> &[Option<u8>] {
        &self.slots
    }

    pub fn block_count(&self) -> usize {
        self.slots.len()
    }

    pub fn pitch_at(&self, block: usize) -> Option<u8> {
        self.slots.get(block).copied().flatten()
    }

    /// Whether every block in `range` is silent.
    pub fn fits(&self, range: Range<usize>) -> bool {
        self.slots
            .get(range)
            .is_some_and(|slots| slots.iter().all(Option::is_none))
    }

    /// Writes `pitch` into every block of `range`.
    ///
    /// # Errors
    ///
    /// Returns [`VoicingError::InternalInvariant`] if the range is out of
    /// bounds or any block in it is already occupied. Occupied blocks are
    /// never overwritten.
    pub fn assign(&mut self, range: Range<usize>, pitch: u8) -> Result<(), VoicingError> {
        if !self.fits(range.clone()) {
            return Err(VoicingError::InternalInvariant(format!(
                "pitch {} would overlap an occupied range in blocks {}..{}",
                pitch, range.start, range.end
            )));
        }
        self.slots[range].fill(Some(pitch));
        Ok(())
    }

    /// Contiguous runs of one pitch, in block order.
    ///
    /// Back-to-back notes of the same pitch come out as a single run.
    pub fn runs(&self) -> Vec<(Range<usize>, u8)> {
        let mut runs: Vec<(Range<usize>, u8)> = Vec::new();
        for (block, slot) in self.slots.iter().enumerate() {
            let Some(pitch) = *slot else { continue };
            match runs.last_mut() {
                Some((range, last)) if *last == pitch && range.end == block => {
                    range.end = block + 1;
                }
                _ => runs.push((block..block + 1, pitch)),
            }
        }
        runs
    }

    pub fn is_silent(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Output of [`allocate_voices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Lanes in creation order.
    pub lanes: Vec<VoiceLane>,
    /// Notes shorter than one block after quantization, which occupy nothing.
    pub collapsed: usize,
}

/// Packs every interval of `table` into lanes over the blocks of `cutoffs`.
///
/// # Errors
///
/// Returns [`VoicingError::InternalInvariant`] if an interval cannot be
/// mapped onto the cutoff set or a write would overlap.
pub fn allocate_voices(
    table: &PitchIntervalTable,
    cutoffs: &CutoffSet,
) -> Result<Allocation, VoicingError> {
    let blocks = cutoffs.block_count();
    let mut lanes: Vec<VoiceLane> = Vec::new();
    let mut collapsed = 0;

    for note in table.iter() {
        let range = cutoffs.block_range(note)?;
        if range.is_empty() {
            tracing::debug!(
                pitch = note.pitch,
                onset = note.onset,
                offset = note.offset,
                "note collapsed by quantization"
            );
            collapsed += 1;
            continue;
        }

        let lane_idx = match lanes.iter().position(|lane| lane.fits(range.clone())) {
            Some(idx) => idx,
            None => {
                lanes.push(VoiceLane::new(blocks));
                lanes.len() - 1
            }
        };
        lanes[lane_idx].assign(range, note.pitch)?;
    }

    if collapsed > 0 {
        tracing::warn!(count = collapsed, "notes shorter than one block were dropped");
    }
    tracing::debug!(lanes = lanes.len(), blocks, "allocated voice lanes");

    Ok(Allocation { lanes, collapsed })
}
