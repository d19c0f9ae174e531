//! Cutoff quantization.
//!
//! Every interval endpoint is a candidate block boundary. Boundaries closer
//! than the merge threshold are folded into the nearest retained boundary on
//! their left, so timing jitter between voices does not split the score into
//! thousands of tiny blocks.

use super::extract::PitchIntervalTable;
use crate::error::VoicingError;
use crate::midi::NoteEvent;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

/// The retained block boundaries of a score.
///
/// Block `i` spans `[ticks[i], ticks[i + 1])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffSet {
    /// Retained cutoffs, strictly increasing.
    ticks: Vec<u32>,
    /// Retained cutoff -> boundary index.
    index: HashMap<u32, usize>,
    /// Original endpoint -> retained cutoff it resolves to.
    representative: HashMap<u32, u32>,
}

impl CutoffSet {
    /// Builds the set from already-retained cutoffs and the merge map.
    fn from_parts(ticks: Vec<u32>, representative: HashMap<u32, u32>) -> Self {
        let index = ticks.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        Self {
            ticks,
            index,
            representative,
        }
    }

    pub fn ticks(&self) -> &[u32] {
        &self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Number of blocks between consecutive cutoffs.
    pub fn block_count(&self) -> usize {
        self.ticks.len().saturating_sub(1)
    }

    /// Number of original endpoints that were folded into an earlier cutoff.
    pub fn merged_count(&self) -> usize {
        self.representative
            .iter()
            .filter(|(original, retained)| original != retained)
            .count()
    }

    pub fn last_tick(&self) -> Option<u32> {
        self.ticks.last().copied()
    }

    /// Retained cutoff an original endpoint resolves to.
    ///
    /// Retained cutoffs resolve to themselves.
    pub fn representative(&self, tick: u32) -> Option<u32> {
        self.representative.get(&tick).copied()
    }

    /// Boundary index of a retained cutoff.
    pub fn index_of(&self, tick: u32) -> Option<usize> {
        self.index.get(&tick).copied()
    }

    /// Tick span `[lo, hi)` of a block.
    pub fn block_bounds(&self, block: usize) -> Option<(u32, u32)> {
        Some((*self.ticks.get(block)?, *self.ticks.get(block + 1)?))
    }

    /// Normalizes an endpoint through the merge map and returns its boundary
    /// index.
    fn boundary(&self, tick: u32) -> Result<usize, VoicingError> {
        self.representative(tick)
            .and_then(|rep| self.index_of(rep))
            .ok_or_else(|| {
                VoicingError::InternalInvariant(format!(
                    "tick {} is not a known cutoff endpoint",
                    tick
                ))
            })
    }

    /// Half-open block range covered by a note after quantization.
    ///
    /// # Errors
    ///
    /// Returns [`VoicingError::InternalInvariant`] if an endpoint was not part
    /// of the table this set was built from.
    pub fn block_range(&self, note: &NoteEvent) -> Result<Range<usize>, VoicingError> {
        let lo = self.boundary(note.onset)?;
        let hi = self.boundary(note.offset)?;
        if hi < lo {
            return Err(VoicingError::InternalInvariant(format!(
                "note {}..{} maps to inverted block range {}..{}",
                note.onset, note.offset, lo, hi
            )));
        }
        Ok(lo..hi)
    }
}

/// Collects all interval endpoints and merges the ones closer than
/// `threshold` ticks.
///
/// The scan compares each candidate against the last retained cutoff, so a
/// run of closely spaced boundaries collapses onto its first member.
pub fn quantize_cutoffs(table: &PitchIntervalTable, threshold: u32) -> CutoffSet {
    let candidates: BTreeSet<u32> = table
        .iter()
        .flat_map(|note| [note.onset, note.offset])
        .collect();

    let mut retained: Vec<u32> = Vec::with_capacity(candidates.len());
    let mut representative = HashMap::with_capacity(candidates.len());

    for tick in candidates {
        match retained.last() {
            Some(&kept) if tick - kept < threshold => {
                representative.insert(tick, kept);
            }
            _ => {
                retained.push(tick);
                representative.insert(tick, tick);
            }
        }
    }

    let cutoffs = CutoffSet::from_parts(retained, representative);
    tracing::debug!(
        retained = cutoffs.len(),
        merged = cutoffs.merged_count(),
        blocks = cutoffs.block_count(),
        "quantized cutoffs"
    );
    cutoffs
}
