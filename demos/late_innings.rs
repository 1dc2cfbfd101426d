/// Late innings demo: narrates the 7th through 9th of a sample game and
/// renders a timing preview with paced silence standing in for speech.
///
/// Run with: cargo run --example late_innings [-- <sound_dir>]
///
/// With a sound directory (catch_fast.wav, bat_primary.wav, ...), the
/// effects are mixed in; without one the preview has pauses only.

use pitchcast::config::BroadcastConfig;
use pitchcast::core::narrator::GameResult;
use pitchcast::core::pipeline::BroadcastPipeline;
use pitchcast::schema::pitch::ScoreLine;
use pitchcast::schema::utterance::{Teams, UtteranceKind};
use pitchcast::source::{EventSource, RonEventSource};
use pitchcast::synth::PacedSilence;
use std::path::Path;

fn main() {
    env_logger::init();

    let events = RonEventSource::new("demos/data").fetch("late_innings");
    if events.is_empty() {
        eprintln!("No events found; run from the repository root.");
        std::process::exit(1);
    }

    let teams = Teams::new("New York", "Los Angeles");
    let config = BroadcastConfig {
        seed: Some(2024),
        announce_count: true,
        sound_dir: std::env::args().nth(1).map(Into::into),
        ..BroadcastConfig::default()
    };

    let mut pipeline = BroadcastPipeline::builder()
        .config(config)
        .key_innings([7, 8, 9].into_iter().collect())
        .game_result(GameResult {
            teams: teams.clone(),
            score: ScoreLine { away: 4, home: 5 },
            innings: 9,
            winning_pitcher: Some("Evan Phillips".to_string()),
            losing_pitcher: Some("Clay Holmes".to_string()),
            save_pitcher: None,
        })
        .build()
        .expect("Failed to build pipeline");

    let outcome = pipeline.produce(&events, Some(&teams), &mut PacedSilence::default());

    println!("=== Late Innings: New York at Los Angeles ===\n");
    for utterance in &outcome.script.utterances {
        match utterance.kind {
            UtteranceKind::InningAnnouncement => println!("\n--- {} ---", utterance.text),
            UtteranceKind::ScoreSummary | UtteranceKind::Recap => println!("  {}", utterance.text),
            UtteranceKind::Pitch => println!("    {}", utterance.text),
        }
    }

    match outcome.audio {
        Ok(composition) => {
            println!(
                "\n{} pitches, {} effects, {:.1} s of audio",
                outcome.selected.len(),
                composition.timeline.effects().count(),
                composition.audio.duration_ms() as f64 / 1000.0
            );
            let out = Path::new("late_innings_preview.wav");
            match composition.audio.write_wav(out) {
                Ok(()) => println!("Wrote {}", out.display()),
                Err(e) => eprintln!("Could not write {}: {}", out.display(), e),
            }
        }
        Err(e) => eprintln!("\nNo audio: {}", e),
    }
}
