/// Pipeline integration tests: game in, script and mixed broadcast out.

use std::collections::BTreeSet;

use pitchcast::audio::clip::AudioClip;
use pitchcast::audio::compositor::{CrowdTiming, EffectCue};
use pitchcast::audio::library::SoundLibrary;
use pitchcast::config::BroadcastConfig;
use pitchcast::core::pipeline::{BroadcastPipeline, PipelineError};
use pitchcast::core::selector::{scoring_innings, SelectionMode};
use pitchcast::schema::effect::EffectKey;
use pitchcast::schema::pitch::{HalfInning, PitchEvent};
use pitchcast::schema::utterance::{Teams, UtteranceKind};
use pitchcast::source::{EventSource, RonEventSource, StaticEventSource};
use pitchcast::synth::{PacedSilence, SpeechSynthesizer, SynthesisError};

/// Nine innings, six pitches per half, two at-bats per half. The visitors
/// score once in the top of the 7th.
fn full_game() -> Vec<PitchEvent> {
    let mut events = Vec::new();
    let mut away_score = 0;
    for inning in 1..=9u32 {
        for half in [HalfInning::Top, HalfInning::Bottom] {
            let pitcher = match half {
                HalfInning::Top => "Walker Buehler",
                HalfInning::Bottom => "Gerrit Cole",
            };
            for p in 0..6usize {
                let batter = format!("Batter{} {}", inning, p / 3);
                let mut e = PitchEvent::new(inning, half, batter, pitcher);
                e.pitch_type = ["Four-Seam Fastball", "Slider", "Changeup"][p % 3].to_string();
                e.speed = [96.5, 86.0, 84.2][p % 3];
                e.balls = (p % 3) as u32;
                e.result = if p % 3 == 2 { "In play, out(s)" } else { "Ball" }.to_string();
                if p % 3 == 2 {
                    e.at_bat_event = Some("Groundout".to_string());
                }
                if inning == 7 && half == HalfInning::Top && p == 5 {
                    e.result = "In play, run(s)".to_string();
                    e.at_bat_event = Some("Home Run".to_string());
                    e.rbi = 1;
                    away_score = 1;
                }
                e.away_score = away_score;
                e.timestamp_ms = events.len() as u64 * 20_000;
                events.push(e);
            }
        }
    }
    events
}

fn library(rate: u32) -> SoundLibrary {
    let mut lib = SoundLibrary::new();
    for key in [
        EffectKey::CatchFast,
        EffectKey::CatchSlow,
        EffectKey::BatPrimary,
        EffectKey::BatRandom,
    ] {
        lib.insert(key, AudioClip::silence(rate, 1, 250));
    }
    lib.insert(EffectKey::CrowdReaction, AudioClip::silence(rate, 1, 500));
    lib
}

/// Records every request and answers with paced silence.
struct Recorder {
    max_len: usize,
    requests: Vec<String>,
}

impl SpeechSynthesizer for Recorder {
    fn max_text_len(&self) -> usize {
        self.max_len
    }

    fn synthesize(&mut self, text: &str) -> Result<AudioClip, SynthesisError> {
        self.requests.push(text.to_string());
        PacedSilence::default().synthesize(text)
    }
}

#[test]
fn long_game_is_sampled_in_order() {
    let source = StaticEventSource::new().with_game("745123", full_game());
    let events = source.fetch("745123");
    assert_eq!(events.len(), 108);

    let pipeline = BroadcastPipeline::builder().seed(42).build().unwrap();
    let selected = pipeline.select(&events);

    // 15 from the start, 10 from the middle, 25 from the end.
    assert_eq!(selected.len(), 50);
    assert_eq!(selected[0], events[0]);
    assert_eq!(selected[15], events[54]);
    assert_eq!(selected[25], events[83]);
    assert_eq!(selected.last(), events.last());
    assert!(selected
        .windows(2)
        .all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
}

#[test]
fn key_innings_narrate_only_those_innings() {
    let events = full_game();
    let mut pipeline = BroadcastPipeline::builder()
        .seed(42)
        .key_innings([7, 8, 9].into_iter().collect())
        .build()
        .unwrap();
    let selected = pipeline.select(&events);
    assert_eq!(selected.len(), 36);

    let script = pipeline.narrate(&selected, Some(&Teams::new("Los Angeles", "New York")));
    let announcements: Vec<&str> = script
        .utterances
        .iter()
        .filter(|u| u.kind == UtteranceKind::InningAnnouncement)
        .map(|u| u.text.as_str())
        .collect();
    assert_eq!(
        announcements,
        vec![
            "Top of the 7th.",
            "Bottom of the 7th.",
            "Top of the 8th.",
            "Bottom of the 8th.",
            "Top of the 9th.",
            "Bottom of the 9th.",
        ]
    );
    assert!(script
        .utterances
        .iter()
        .any(|u| u.text == "After the top of the 7th, Los Angeles leads 1 to 0."));
    assert_eq!(
        script.utterances.last().unwrap().text,
        "That does it for our coverage, and Los Angeles leads 1 to 0."
    );
}

#[test]
fn half_inning_selection() {
    let events = full_game();
    let mut pipeline = BroadcastPipeline::builder()
        .seed(1)
        .selection(SelectionMode::HalfInning {
            inning: 7,
            half: HalfInning::Top,
        })
        .build()
        .unwrap();
    let selected = pipeline.select(&events);
    assert_eq!(selected.len(), 6);
    let script = pipeline.narrate(&selected, None);
    assert_eq!(script.utterances[0].text, "Top of the 7th.");
    assert!(script
        .utterances
        .iter()
        .any(|u| u.text.contains("That brings in a run.")));
}

#[test]
fn same_seed_same_broadcast() {
    let run = |seed: u64| {
        let mut pipeline = BroadcastPipeline::builder()
            .seed(seed)
            .with_library(library(8_000))
            .build()
            .unwrap();
        let outcome = pipeline.produce(&full_game(), None, &mut PacedSilence::default());
        let composition = outcome.audio.unwrap();
        (outcome.script, composition.timeline)
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn every_selected_pitch_gets_a_cue() {
    let events = full_game();
    let mut pipeline = BroadcastPipeline::builder()
        .seed(42)
        .selection(SelectionMode::All)
        .with_library(library(22_050))
        .build()
        .unwrap();
    let outcome = pipeline.produce(&events, None, &mut PacedSilence::default());
    let composition = outcome.audio.unwrap();

    let effects: Vec<EffectKey> = composition.timeline.effects().map(|(_, k)| k).collect();
    let catches = effects
        .iter()
        .filter(|k| matches!(k, EffectKey::CatchFast | EffectKey::CatchSlow))
        .count();
    let bats = effects
        .iter()
        .filter(|k| matches!(k, EffectKey::BatPrimary | EffectKey::BatRandom))
        .count();
    assert_eq!(catches, 72);
    assert_eq!(bats, 36);
    // Groundouts keep the crowd quiet; the home run does not.
    assert_eq!(
        effects
            .iter()
            .filter(|k| **k == EffectKey::CrowdReaction)
            .count(),
        1
    );
}

#[test]
fn chunks_respect_provider_ceiling() {
    let mut pipeline = BroadcastPipeline::builder()
        .seed(42)
        .selection(SelectionMode::All)
        .build()
        .unwrap();
    let mut synth = Recorder {
        max_len: 300,
        requests: Vec::new(),
    };
    let outcome = pipeline.produce(&full_game(), None, &mut synth);
    assert!(outcome.audio.is_ok());
    assert!(synth.requests.len() > 1);
    assert!(synth.requests.iter().all(|r| r.chars().count() <= 300));

    let spoken: Vec<String> = synth
        .requests
        .iter()
        .flat_map(|r| r.split_whitespace().map(str::to_string))
        .collect();
    let written: Vec<String> = outcome
        .script
        .to_text()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    assert_eq!(spoken, written);
}

#[test]
fn unbounded_provider_uses_configured_ceiling() {
    let config = BroadcastConfig {
        max_chunk_chars: 120,
        ..BroadcastConfig::default()
    };
    let mut pipeline = BroadcastPipeline::builder()
        .config(config)
        .seed(3)
        .build()
        .unwrap();
    let mut synth = Recorder {
        max_len: 0,
        requests: Vec::new(),
    };
    let outcome = pipeline.produce(&full_game(), None, &mut synth);
    assert!(outcome.audio.is_ok());
    assert!(synth.requests.iter().all(|r| r.chars().count() <= 120));
}

#[test]
fn crowd_timing_changes_block_length() {
    let narration = AudioClip::silence(8_000, 1, 1_000);
    let cues = [EffectCue {
        offset_ms: 0,
        effects: vec![EffectKey::CrowdReaction, EffectKey::BatPrimary],
    }];

    let compose = |timing: CrowdTiming| {
        let config = BroadcastConfig {
            crowd_timing: timing,
            ..BroadcastConfig::default()
        };
        let mut pipeline = BroadcastPipeline::builder()
            .config(config)
            .seed(1)
            .with_library(library(8_000))
            .build()
            .unwrap();
        pipeline.compose(&narration, &cues)
    };

    let sequential = compose(CrowdTiming::Sequential);
    assert_eq!(sequential.audio.duration_ms(), 1_000 + 800 + 250 + 500 + 300);
    let starts: Vec<(usize, EffectKey)> = sequential.timeline.effects().collect();
    assert_eq!(
        starts,
        vec![(6_400, EffectKey::BatPrimary), (8_400, EffectKey::CrowdReaction)]
    );

    let simultaneous = compose(CrowdTiming::Simultaneous);
    assert_eq!(simultaneous.audio.duration_ms(), 1_000 + 800 + 500 + 300);
    assert!(simultaneous
        .timeline
        .effects()
        .all(|(start, _)| start == 6_400));
}

#[test]
fn config_file_drives_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broadcast.ron");
    std::fs::write(
        &path,
        r#"(
            max_events: 20,
            sample_head: 5,
            sample_middle: 5,
            sample_tail: 10,
            seed: Some(7),
            announce_count: true,
        )"#,
    )
    .unwrap();

    let mut pipeline = BroadcastPipeline::builder()
        .config_file(&path)
        .build()
        .unwrap();
    assert_eq!(pipeline.config().seed, Some(7));
    let selected = pipeline.select(&full_game());
    assert_eq!(selected.len(), 20);

    let script = pipeline.narrate(&selected, None);
    assert!(script
        .utterances
        .iter()
        .any(|u| u.text.ends_with("The count is 1 and 0.")));
}

#[test]
fn missing_config_file_is_an_error() {
    let result = BroadcastPipeline::builder()
        .config_file("no/such/broadcast.ron")
        .build();
    assert!(matches!(result, Err(PipelineError::Config(_))));
}

#[test]
fn demo_game_loads_from_ron() {
    let source = RonEventSource::new("demos/data");
    let events = source.fetch("late_innings");
    assert_eq!(events.len(), 68);
    assert_eq!(scoring_innings(&events), BTreeSet::from([7, 9]));
    let last = events.last().unwrap();
    assert_eq!((last.away_score, last.home_score), (4, 5));
    assert!(source.fetch("no_such_game").is_empty());
}
