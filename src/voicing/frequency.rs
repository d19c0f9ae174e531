//! Expands lane block assignments into per-tick frequency curves.

use super::allocate::VoiceLane;
use super::cutoffs::CutoffSet;
use crate::config::VoicingConfig;
use crate::midi::{pitch_to_hz, PITCH_COUNT};
use serde::{Deserialize, Serialize};

/// Target frequency of one lane at every tick, in Hz. Zero means silence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencyTrack {
    hz: Vec<f64>,
}

impl FrequencyTrack {
    pub fn new(hz: Vec<f64>) -> Self {
        Self { hz }
    }

    pub fn samples(&self) -> &[f64] {
        &self.hz
    }

    /// Number of ticks covered.
    pub fn len(&self) -> usize {
        self.hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hz.is_empty()
    }

    /// Frequency at `tick`; ticks past the end are silent.
    pub fn at(&self, tick: usize) -> f64 {
        self.hz.get(tick).copied().unwrap_or(0.0)
    }
}

/// Builds one curve per lane, spanning tick 0 up to the last cutoff.
///
/// Every block of a lane is filled with its pitch's frequency, or 0 Hz where
/// the lane is silent. Ticks before the first cutoff are always silent.
pub fn synthesize_tracks(
    lanes: &[VoiceLane],
    cutoffs: &CutoffSet,
    config: &VoicingConfig,
) -> Vec<FrequencyTrack> {
    let total_ticks = cutoffs.last_tick().unwrap_or(0) as usize;
    let pitch_hz: Vec<f64> = (0..PITCH_COUNT as u8)
        .map(|p| pitch_to_hz(p, config.reference_pitch, config.reference_hz))
        .collect();

    lanes
        .iter()
        .map(|lane| {
            let mut hz = vec![0.0; total_ticks];
            for (block, slot) in lane.slots().iter().enumerate() {
                let (Some(pitch), Some((lo, hi))) = (slot, cutoffs.block_bounds(block)) else {
                    continue;
                };
                hz[lo as usize..hi as usize].fill(pitch_hz[*pitch as usize]);
            }
            FrequencyTrack::new(hz)
        })
        .collect()
}
