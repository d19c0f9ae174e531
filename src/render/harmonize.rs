//! Lane-by-lane harmonization and mixing.

use super::{resample_track, silence_mask};
use crate::voicing::FrequencyTrack;
use rayon::prelude::*;

/// A pitch-shifting engine that re-pitches a waveform toward a target curve.
///
/// `target_hz` has one entry per input sample. Implementations may return a
/// buffer of any length; the mixer pads or truncates it to the input length.
pub trait Harmonizer: Sync {
    fn harmonize(&self, waveform: &[f32], sample_rate: u32, target_hz: &[f64]) -> Vec<f32>;
}

impl<F> Harmonizer for F
where
    F: Fn(&[f32], u32, &[f64]) -> Vec<f32> + Sync,
{
    fn harmonize(&self, waveform: &[f32], sample_rate: u32, target_hz: &[f64]) -> Vec<f32> {
        self(waveform, sample_rate, target_hz)
    }
}

/// Harmonizes `waveform` once per lane and averages the results.
///
/// Lanes are processed in parallel. Wherever a lane's target is below
/// `silence_threshold_hz`, that lane contributes silence rather than
/// whatever the engine produced there. With no lanes the output is silent.
pub fn mix_harmonies<H: Harmonizer + ?Sized>(
    waveform: &[f32],
    sample_rate: u32,
    tracks: &[FrequencyTrack],
    harmonizer: &H,
    silence_threshold_hz: f64,
) -> Vec<f32> {
    let samples = waveform.len();
    if tracks.is_empty() {
        return vec![0.0; samples];
    }

    let mut mixed = tracks
        .par_iter()
        .map(|track| {
            let target = resample_track(track.samples(), samples);
            let mask = silence_mask(track.samples(), samples, silence_threshold_hz);
            let mut voice = harmonizer.harmonize(waveform, sample_rate, &target);
            voice.resize(samples, 0.0);
            for (sample, silent) in voice.iter_mut().zip(mask) {
                if silent {
                    *sample = 0.0;
                }
            }
            voice
        })
        .reduce(
            || vec![0.0; samples],
            |mut acc, voice| {
                for (a, v) in acc.iter_mut().zip(voice) {
                    *a += v;
                }
                acc
            },
        );

    let scale = 1.0 / tracks.len() as f32;
    for sample in &mut mixed {
        *sample *= scale;
    }
    tracing::debug!(lanes = tracks.len(), samples, "mixed harmonized lanes");
    mixed
}
