//! Error types for score decoding, voice planning and configuration.

use thiserror::Error;

/// Errors raised by the voicing pipeline.
///
/// Both variants are structural: the pipeline is deterministic, so retrying
/// the same score reproduces the same failure.
#[derive(Error, Debug)]
pub enum VoicingError {
    /// The score contains no note intervals at all, so it has no duration.
    #[error("score contains no playable notes")]
    NoPlayableNotes,

    /// A pipeline invariant was broken. This is a bug, never a data problem.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

/// Errors that can occur while decoding a Standard MIDI File.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// MIDI parsing failed
    #[error("MIDI parse error: {0}")]
    Parse(String),

    /// SMPTE timecode files have no ticks-per-quarter reference
    #[error("unsupported timing: {0}")]
    UnsupportedTiming(String),

    /// Format 2 (sequential) files
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised while loading or validating a [`crate::VoicingConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while saving or loading a [`crate::VoicePlan`].
#[derive(Error, Debug)]
pub enum PlanFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),
}
