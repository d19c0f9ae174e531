//! midivox - plan harmony voice lanes from a MIDI score.
//!
//! # Usage
//!
//! ```bash
//! midivox plan song.mid                      # print a summary
//! midivox plan song.mid -o song.plan.json    # also write the plan
//! midivox lanes song.mid                     # list the notes of every lane
//! ```
//!
//! Set `RUST_LOG=midivox=debug` for per-stage diagnostics.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use midivox::midi::note_to_name;
use midivox::{plan_voices, Score, VoicePlan, VoicingConfig};
use std::path::{Path, PathBuf};

/// Split a polyphonic MIDI score into monophonic voice lanes
#[derive(Parser)]
#[command(name = "midivox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan voice lanes and print a summary
    Plan {
        /// Input MIDI file (.mid or .midi)
        score: PathBuf,

        /// Write the plan here (.json for JSON, anything else for binary)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file overriding the default voicing settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the notes assigned to each lane
    Lanes {
        /// Input MIDI file (.mid or .midi)
        score: PathBuf,

        /// JSON file overriding the default voicing settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan {
            score,
            output,
            config,
        } => {
            let plan = build_plan(&score, config.as_deref())?;
            print_summary(&plan);
            if let Some(output) = output {
                plan.save(&output)
                    .with_context(|| format!("Failed to write plan: {}", output.display()))?;
                println!("Plan written to {}", output.display());
            }
        }
        Commands::Lanes { score, config } => {
            let plan = build_plan(&score, config.as_deref())?;
            print_lanes(&plan);
        }
    }

    Ok(())
}

fn build_plan(score_path: &Path, config_path: Option<&Path>) -> Result<VoicePlan> {
    let is_midi = score_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi"));
    if !is_midi {
        bail!("Not a MIDI file: {}", score_path.display());
    }

    let config = match config_path {
        Some(path) => VoicingConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => VoicingConfig::default(),
    };

    let score = Score::load(score_path)
        .with_context(|| format!("Failed to read score: {}", score_path.display()))?;
    let plan = plan_voices(&score, &config)
        .with_context(|| format!("Failed to plan voices for {}", score_path.display()))?;
    Ok(plan)
}

fn print_summary(plan: &VoicePlan) {
    let bpm = 60_000_000.0 / plan.tempo as f64;
    println!("Tempo:     {} us/quarter ({:.1} BPM)", plan.tempo, bpm);
    println!("Duration:  {:.2} s", plan.duration_seconds());
    println!("Notes:     {}", plan.stats.intervals);
    println!("Lanes:     {}", plan.lane_count());
    println!(
        "Blocks:    {} ({} boundaries merged)",
        plan.block_count(),
        plan.stats.merged_cutoffs
    );

    let report = &plan.stats.extract;
    if report.repaired_open > 0 {
        println!("Warning: {} unterminated notes closed at end of score", report.repaired_open);
    }
    if plan.stats.collapsed_notes > 0 {
        println!(
            "Warning: {} notes too short to survive quantization",
            plan.stats.collapsed_notes
        );
    }
}

fn print_lanes(plan: &VoicePlan) {
    for (idx, lane) in plan.lanes.iter().enumerate() {
        println!("Lane {}:", idx + 1);
        for (blocks, pitch) in lane.runs() {
            let start = plan.cutoffs[blocks.start];
            let end = plan.cutoffs[blocks.end];
            println!("  {:>8}..{:<8} {}", start, end, note_to_name(pitch));
        }
    }
}
