//! Tunables for the voicing pipeline.
//!
//! Every field has a serde default, so a config file only needs to name the
//! values it overrides.

use crate::error::ConfigError;
use crate::midi::DEFAULT_TEMPO_USEC;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a note-on is treated when the same pitch is already sounding on the
/// same track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Opens nest. A note-off closes the most recently opened interval.
    #[default]
    Stack,
    /// A repeated note-on first closes the sounding interval at the current tick.
    Retrigger,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoicingConfig {
    /// Cutoffs closer than this many ticks are merged into one.
    #[serde(default = "VoicingConfig::default_merge_threshold_ticks")]
    pub merge_threshold_ticks: u32,

    /// MIDI pitch that sounds at `reference_hz`.
    #[serde(default = "VoicingConfig::default_reference_pitch")]
    pub reference_pitch: u8,

    #[serde(default = "VoicingConfig::default_reference_hz")]
    pub reference_hz: f64,

    /// Resampled targets below this frequency are rendered as silence.
    #[serde(default = "VoicingConfig::default_silence_threshold_hz")]
    pub silence_threshold_hz: f64,

    #[serde(default)]
    pub overlap_policy: OverlapPolicy,

    /// Microseconds per quarter note when the score never sets a tempo.
    #[serde(default = "VoicingConfig::default_tempo")]
    pub default_tempo: u32,
}

impl VoicingConfig {
    fn default_merge_threshold_ticks() -> u32 {
        200
    }
    fn default_reference_pitch() -> u8 {
        57
    }
    fn default_reference_hz() -> f64 {
        220.0
    }
    fn default_silence_threshold_hz() -> f64 {
        10.0
    }
    fn default_tempo() -> u32 {
        DEFAULT_TEMPO_USEC
    }

    /// Loads a config from a JSON file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merge_threshold_ticks == 0 {
            return Err(ConfigError::Invalid(
                "merge_threshold_ticks must be at least 1".to_string(),
            ));
        }
        if self.reference_pitch > 127 {
            return Err(ConfigError::Invalid(format!(
                "reference_pitch {} is outside 0-127",
                self.reference_pitch
            )));
        }
        if !(self.reference_hz.is_finite() && self.reference_hz > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "reference_hz must be positive, got {}",
                self.reference_hz
            )));
        }
        if !(self.silence_threshold_hz.is_finite() && self.silence_threshold_hz >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "silence_threshold_hz must be non-negative, got {}",
                self.silence_threshold_hz
            )));
        }
        if self.default_tempo == 0 {
            return Err(ConfigError::Invalid("default_tempo must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Default for VoicingConfig {
    fn default() -> Self {
        Self {
            merge_threshold_ticks: Self::default_merge_threshold_ticks(),
            reference_pitch: Self::default_reference_pitch(),
            reference_hz: Self::default_reference_hz(),
            silence_threshold_hz: Self::default_silence_threshold_hz(),
            overlap_policy: OverlapPolicy::default(),
            default_tempo: Self::default_tempo(),
        }
    }
}
