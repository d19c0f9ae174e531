//! midivox - Split a polyphonic MIDI score into monophonic voice lanes.
//!
//! Each lane carries a per-tick frequency curve meant to drive an external
//! pitch-shifting engine, so one recorded voice can be harmonized into every
//! part of the score.

pub mod config;
pub mod error;
pub mod midi;
pub mod render;
pub mod voicing;

// Re-export commonly used types
pub use config::{OverlapPolicy, VoicingConfig};
pub use error::{ConfigError, PlanFileError, ScoreError, VoicingError};
pub use midi::{NoteEvent, Score};
pub use render::{mix_harmonies, Harmonizer};
pub use voicing::{plan_voices, FrequencyTrack, VoiceLane, VoicePlan};
