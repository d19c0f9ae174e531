//! The voice plan: everything a harmonization engine needs from a score.

use super::allocate::{allocate_voices, VoiceLane};
use super::cutoffs::quantize_cutoffs;
use super::extract::{extract_intervals, ExtractReport};
use super::frequency::{synthesize_tracks, FrequencyTrack};
use crate::config::VoicingConfig;
use crate::error::{PlanFileError, VoicingError};
use crate::midi::{ticks_to_seconds, Score};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Counters describing how much of the plan was repaired or lost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    pub intervals: usize,
    pub merged_cutoffs: usize,
    /// Notes that fell inside a single merged boundary and occupy no block.
    pub collapsed_notes: usize,
    pub extract: ExtractReport,
}

/// Result of running the full pipeline over one score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicePlan {
    /// Microseconds per quarter note.
    pub tempo: u32,
    pub ticks_per_quarter: u16,
    /// Latest note offset in the score, before quantization.
    pub score_ticks: u32,
    /// Retained block boundaries, strictly increasing.
    pub cutoffs: Vec<u32>,
    pub lanes: Vec<VoiceLane>,
    /// One curve per lane, same order as `lanes`.
    pub frequencies: Vec<FrequencyTrack>,
    pub stats: PlanStats,
}

/// Runs extraction, quantization, allocation and curve synthesis.
///
/// # Errors
///
/// Returns [`VoicingError::NoPlayableNotes`] for a score without notes or
/// one whose every note collapses under quantization, and
/// [`VoicingError::InternalInvariant`] if a stage breaks its contract.
pub fn plan_voices(score: &Score, config: &VoicingConfig) -> Result<VoicePlan, VoicingError> {
    let extraction = extract_intervals(&score.tracks, config)?;
    let cutoffs = quantize_cutoffs(&extraction.table, config.merge_threshold_ticks);
    let allocation = allocate_voices(&extraction.table, &cutoffs)?;
    if allocation.lanes.is_empty() {
        tracing::warn!(
            collapsed = allocation.collapsed,
            threshold = config.merge_threshold_ticks,
            "every note collapsed under quantization"
        );
        return Err(VoicingError::NoPlayableNotes);
    }
    let frequencies = synthesize_tracks(&allocation.lanes, &cutoffs, config);

    let stats = PlanStats {
        intervals: extraction.table.interval_count(),
        merged_cutoffs: cutoffs.merged_count(),
        collapsed_notes: allocation.collapsed,
        extract: extraction.report,
    };

    tracing::info!(
        lanes = allocation.lanes.len(),
        blocks = cutoffs.block_count(),
        intervals = stats.intervals,
        "planned voice lanes"
    );

    Ok(VoicePlan {
        tempo: extraction.tempo,
        ticks_per_quarter: score.ticks_per_quarter,
        score_ticks: extraction.table.last_tick().unwrap_or(0),
        cutoffs: cutoffs.ticks().to_vec(),
        lanes: allocation.lanes,
        frequencies,
        stats,
    })
}

impl VoicePlan {
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn block_count(&self) -> usize {
        self.cutoffs.len().saturating_sub(1)
    }

    /// Tick at which the last block ends, which is the curve length.
    pub fn total_ticks(&self) -> u32 {
        self.cutoffs.last().copied().unwrap_or(0)
    }

    /// Playing time of the score in seconds, up to its last note-off.
    ///
    /// Measured from the unquantized score, so a trailing boundary merged
    /// into an earlier cutoff still counts.
    pub fn duration_seconds(&self) -> f64 {
        ticks_to_seconds(self.score_ticks, self.tempo, self.ticks_per_quarter)
    }

    /// Seconds per tick, for resampling the curves to an audio rate.
    pub fn seconds_per_tick(&self) -> f64 {
        ticks_to_seconds(1, self.tempo, self.ticks_per_quarter)
    }

    /// Saves the plan, as JSON for a `.json` path and bincode otherwise.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PlanFileError> {
        let path = path.as_ref();
        let data = if is_json(path) {
            serde_json::to_vec_pretty(self)?
        } else {
            bincode::serialize(self)?
        };
        fs::write(path, data)?;
        Ok(())
    }

    /// Loads a plan written by [`VoicePlan::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PlanFileError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        if is_json(path) {
            Ok(serde_json::from_slice(&data)?)
        } else {
            Ok(bincode::deserialize(&data)?)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
