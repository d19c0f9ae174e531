//! End-to-end tests: encoded MIDI bytes in, voice plan out.

use midivox::midi::pitch_to_hz;
use midivox::{plan_voices, NoteEvent, Score, VoicingConfig, VoicingError};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::collections::BTreeSet;

/// A note as (pitch, onset, offset) in absolute ticks.
type Note = (u8, u32, u32);

/// Encodes one SMF track per note list, with a tempo track in front.
fn encode_smf(tempo: u32, tracks: &[&[Note]]) -> Vec<u8> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(480)),
    ));
    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);

    for notes in tracks {
        // (tick, is_on, pitch), offs before ons at the same tick
        let mut events: Vec<(u32, bool, u8)> = notes
            .iter()
            .flat_map(|&(pitch, on, off)| [(on, true, pitch), (off, false, pitch)])
            .collect();
        events.sort_by_key(|&(tick, is_on, _)| (tick, is_on));

        let mut track = Vec::new();
        let mut last = 0;
        for (tick, is_on, pitch) in events {
            let message = if is_on {
                MidiMessage::NoteOn {
                    key: u7::new(pitch),
                    vel: u7::new(100),
                }
            } else {
                MidiMessage::NoteOff {
                    key: u7::new(pitch),
                    vel: u7::new(0),
                }
            };
            track.push(TrackEvent {
                delta: u28::new(tick - last),
                kind: TrackEventKind::Midi {
                    channel: u4::new(0),
                    message,
                },
            });
            last = tick;
        }
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).unwrap();
    bytes
}

fn plan_from_notes(tracks: &[&[Note]]) -> midivox::VoicePlan {
    let score = Score::from_smf_bytes(&encode_smf(500_000, tracks)).unwrap();
    plan_voices(&score, &VoicingConfig::default()).unwrap()
}

#[test]
fn test_same_pitch_sequential_notes_use_one_lane() {
    let plan = plan_from_notes(&[&[(60, 0, 480), (60, 960, 1440)]]);
    assert_eq!(plan.lane_count(), 1);
}

#[test]
fn test_overlapping_pitches_use_two_lanes() {
    let plan = plan_from_notes(&[&[(60, 0, 960)], &[(67, 480, 1440)]]);
    assert_eq!(plan.lane_count(), 2);
    for lane in &plan.lanes {
        let pitches: BTreeSet<u8> = lane.slots().iter().flatten().copied().collect();
        assert_eq!(pitches.len(), 1);
    }
}

#[test]
fn test_chord_uses_one_lane_per_note() {
    let chord: Vec<Note> = [48, 52, 55, 60, 64]
        .iter()
        .map(|&p| (p, 0, 1920))
        .collect();
    let plan = plan_from_notes(&[chord.as_slice()]);
    assert_eq!(plan.lane_count(), 5);
    assert_eq!(plan.frequencies.len(), 5);
}

#[test]
fn test_jittered_boundaries_merge() {
    let plan = plan_from_notes(&[&[(60, 0, 1000)], &[(64, 1050, 2000)]]);
    assert_eq!(plan.cutoffs, vec![0, 1000, 2000]);
    assert_eq!(plan.stats.merged_cutoffs, 1);
    // merged onto the earlier boundary, so both notes share one lane
    assert_eq!(plan.lane_count(), 1);
}

#[test]
fn test_reference_frequencies() {
    assert_eq!(pitch_to_hz(57, 57, 220.0), 220.0);
    assert_eq!(pitch_to_hz(69, 57, 220.0), 440.0);

    let plan = plan_from_notes(&[&[(57, 0, 480), (69, 480, 960)]]);
    let track = &plan.frequencies[0];
    assert_eq!(track.at(0), 220.0);
    assert_eq!(track.at(480), 440.0);
    assert_eq!(track.len(), 960);
}

#[test]
fn test_tempo_and_duration_from_file() {
    let score = Score::from_smf_bytes(&encode_smf(250_000, &[&[(60, 0, 1920)]])).unwrap();
    let plan = plan_voices(&score, &VoicingConfig::default()).unwrap();
    assert_eq!(plan.tempo, 250_000);
    assert_eq!(plan.ticks_per_quarter, 480);
    assert!((plan.duration_seconds() - 1.0).abs() < 1e-9);
}

#[test]
fn test_duration_runs_to_last_note_off() {
    // 1150 merges onto the 1000 boundary but still ends the score
    let plan = plan_from_notes(&[&[(60, 0, 1000), (62, 0, 1150)]]);
    assert_eq!(plan.total_ticks(), 1000);
    assert_eq!(plan.score_ticks, 1150);
    assert!((plan.duration_seconds() - 1.197_916_666).abs() < 1e-6);
}

#[test]
fn test_single_short_note_has_no_playable_notes() {
    let score = Score::from_smf_bytes(&encode_smf(500_000, &[&[(60, 0, 100)]])).unwrap();
    assert!(matches!(
        plan_voices(&score, &VoicingConfig::default()),
        Err(VoicingError::NoPlayableNotes)
    ));
}

#[test]
fn test_tempo_only_file_has_no_playable_notes() {
    let score = Score::from_smf_bytes(&encode_smf(500_000, &[])).unwrap();
    assert!(matches!(
        plan_voices(&score, &VoicingConfig::default()),
        Err(VoicingError::NoPlayableNotes)
    ));
}

#[test]
fn test_lane_runs_match_notes() {
    let plan = plan_from_notes(&[&[(60, 0, 480), (62, 480, 960)], &[(55, 0, 960)]]);
    assert_eq!(plan.lane_count(), 2);

    // pitch-ascending order: 55 claims the first lane
    let first: Vec<NoteEvent> = plan.lanes[0]
        .runs()
        .into_iter()
        .map(|(blocks, pitch)| {
            NoteEvent::new(pitch, plan.cutoffs[blocks.start], plan.cutoffs[blocks.end])
        })
        .collect();
    assert_eq!(first, vec![NoteEvent::new(55, 0, 960)]);
    assert!(plan.lanes[1].runs().iter().all(|(_, p)| *p == 60 || *p == 62));
}
