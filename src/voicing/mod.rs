//! Polyphonic score to monophonic voice lanes.
//!
//! The pipeline runs in four stages, each consuming the previous stage's
//! complete output:
//!
//! 1. [`extract_intervals`] pairs note messages into per-pitch intervals
//! 2. [`quantize_cutoffs`] merges nearby interval boundaries into blocks
//! 3. [`allocate_voices`] packs intervals first-fit into non-overlapping lanes
//! 4. [`synthesize_tracks`] turns each lane into a per-tick frequency curve
//!
//! [`plan_voices`] runs all four and returns a [`VoicePlan`].

mod allocate;
mod cutoffs;
mod extract;
mod frequency;
mod plan;

pub use allocate::{allocate_voices, Allocation, VoiceLane};
pub use cutoffs::{quantize_cutoffs, CutoffSet};
pub use extract::{extract_intervals, final_tempo, ExtractReport, Extraction, PitchIntervalTable};
pub use frequency::{synthesize_tracks, FrequencyTrack};
pub use plan::{plan_voices, PlanStats, VoicePlan};
