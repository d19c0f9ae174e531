//! Hand-off to a harmonization engine.
//!
//! A [`crate::VoicePlan`] holds one frequency curve per lane on the score's
//! tick axis. An engine works on audio samples instead, so this module:
//! - Resamples tick curves onto a waveform's sample axis
//! - Marks samples whose target is below the silence threshold
//! - Runs a [`Harmonizer`] per lane and mixes the results

mod harmonize;

pub use harmonize::{mix_harmonies, Harmonizer};

/// Tick index feeding sample `sample` when `ticks` ticks are stretched over
/// `samples` samples.
fn source_index(sample: usize, ticks: usize, samples: usize) -> usize {
    ((sample as u128 * ticks as u128) / samples as u128) as usize
}

/// Stretches a tick curve to `samples` samples.
///
/// Each sample takes the value of the last tick starting at or before it, so
/// block edges stay sharp instead of gliding between pitches.
pub fn resample_track(track: &[f64], samples: usize) -> Vec<f64> {
    if track.is_empty() {
        return vec![0.0; samples];
    }
    (0..samples)
        .map(|i| track[source_index(i, track.len(), samples)])
        .collect()
}

/// Per-sample flags, `true` where the resampled target is below
/// `threshold_hz` and the output must be forced to silence.
pub fn silence_mask(track: &[f64], samples: usize, threshold_hz: f64) -> Vec<bool> {
    resample_track(track, samples)
        .into_iter()
        .map(|hz| hz < threshold_hz)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_stretches() {
        let track = [0.0, 220.0];
        assert_eq!(resample_track(&track, 4), vec![0.0, 0.0, 220.0, 220.0]);
    }

    #[test]
    fn test_resample_shrinks() {
        let track = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(resample_track(&track, 3), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_resample_empty() {
        assert_eq!(resample_track(&[], 3), vec![0.0; 3]);
        assert!(resample_track(&[440.0], 0).is_empty());
    }

    #[test]
    fn test_silence_mask_threshold() {
        let track = [0.0, 9.9, 10.0, 440.0];
        assert_eq!(
            silence_mask(&track, 8, 10.0),
            vec![true, true, true, true, false, false, false, false]
        );
    }
}
