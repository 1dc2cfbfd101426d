/// Sound library and mixdown integration tests against real WAV files.

use std::path::Path;

use pitchcast::audio::clip::{db_to_amplitude, AudioClip};
use pitchcast::audio::compositor::SegmentSource;
use pitchcast::audio::library::SoundLibrary;
use pitchcast::config::BroadcastConfig;
use pitchcast::core::pipeline::BroadcastPipeline;
use pitchcast::core::selector::SelectionMode;
use pitchcast::schema::effect::EffectKey;
use pitchcast::schema::pitch::{HalfInning, PitchEvent};
use pitchcast::synth::PacedSilence;

fn tone(rate: u32, channels: u16, ms: u64, value: f32) -> AudioClip {
    let frames = (rate as u64 * ms / 1000) as usize;
    AudioClip::new(rate, channels, vec![value; frames * channels as usize]).unwrap()
}

/// A library directory with one clip per key, two bat variants and a
/// stereo 44.1 kHz crowd clip.
fn write_library(dir: &Path) {
    tone(22_050, 1, 200, 0.0).write_wav(&dir.join("catch_fast.wav")).unwrap();
    tone(22_050, 1, 200, 0.0).write_wav(&dir.join("catch_slow.wav")).unwrap();
    tone(22_050, 1, 300, 0.0).write_wav(&dir.join("bat_primary.wav")).unwrap();
    tone(44_100, 2, 600, 0.0)
        .write_wav(&dir.join("crowd_reaction.wav"))
        .unwrap();

    let variants = dir.join("bat_random");
    std::fs::create_dir(&variants).unwrap();
    tone(22_050, 1, 300, 0.0).write_wav(&variants.join("crack_a.wav")).unwrap();
    tone(22_050, 1, 300, 0.0).write_wav(&variants.join("crack_b.WAV")).unwrap();
    std::fs::write(variants.join("notes.txt"), "not audio").unwrap();
}

fn at_bat() -> Vec<PitchEvent> {
    let mut events = Vec::new();
    for (i, (pitch_type, speed, result)) in [
        ("Four-Seam Fastball", 97.0, "Called Strike"),
        ("Slider", 85.5, "Ball"),
        ("Sinker", 94.1, "In play, no out"),
    ]
    .into_iter()
    .enumerate()
    {
        let mut e = PitchEvent::new(3, HalfInning::Bottom, "Freddie Freeman", "Zack Wheeler");
        e.pitch_type = pitch_type.to_string();
        e.speed = speed;
        e.result = result.to_string();
        e.timestamp_ms = i as u64 * 15_000;
        events.push(e);
    }
    events[2].at_bat_event = Some("Single".to_string());
    events
}

#[test]
fn library_loads_single_files_and_variants() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());

    let library = SoundLibrary::load(dir.path());
    assert!(library.contains(EffectKey::CatchFast));
    assert!(library.contains(EffectKey::CrowdReaction));
    assert_eq!(library.variants(EffectKey::BatRandom).len(), 2);
    assert!(!library.contains(EffectKey::BatBunt));
    assert!(!library.contains(EffectKey::Ambient));

    let crowd = library.get(EffectKey::CrowdReaction).unwrap();
    assert_eq!(crowd.sample_rate, 44_100);
    assert_eq!(crowd.channels, 2);
    assert_eq!(crowd.duration_ms(), 600);
}

#[test]
fn unreadable_clip_only_disables_its_key() {
    let dir = tempfile::tempdir().unwrap();
    write_library(dir.path());
    std::fs::write(dir.path().join("catch_fast.wav"), b"RIFF garbage").unwrap();

    let library = SoundLibrary::load(dir.path());
    assert!(!library.contains(EffectKey::CatchFast));
    assert!(library.contains(EffectKey::CatchSlow));
    assert!(library.contains(EffectKey::BatPrimary));
}

#[test]
fn missing_directory_is_an_empty_library() {
    let dir = tempfile::tempdir().unwrap();
    let library = SoundLibrary::load(&dir.path().join("sounds"));
    assert!(library.is_empty());
}

#[test]
fn broadcast_renders_to_wav() {
    let dir = tempfile::tempdir().unwrap();
    let sounds = dir.path().join("sounds");
    std::fs::create_dir(&sounds).unwrap();
    write_library(&sounds);

    let config = BroadcastConfig {
        sound_dir: Some(sounds),
        seed: Some(11),
        ..BroadcastConfig::default()
    };
    let mut pipeline = BroadcastPipeline::builder()
        .config(config)
        .selection(SelectionMode::All)
        .build()
        .unwrap();
    let outcome = pipeline.produce(&at_bat(), None, &mut PacedSilence::default());
    let composition = outcome.audio.unwrap();

    let effects: Vec<EffectKey> = composition.timeline.effects().map(|(_, k)| k).collect();
    assert_eq!(effects.len(), 4);
    assert_eq!(effects[0], EffectKey::CatchFast);
    assert_eq!(effects[1], EffectKey::CatchSlow);
    assert!(matches!(effects[2], EffectKey::BatPrimary | EffectKey::BatRandom));
    assert_eq!(effects[3], EffectKey::CrowdReaction);

    // The 44.1 kHz stereo crowd clip is resampled into the narration format.
    let crowd = composition
        .timeline
        .segments
        .iter()
        .find(|s| s.source == SegmentSource::Effect(EffectKey::CrowdReaction))
        .unwrap();
    assert!(crowd.frames.abs_diff(22_050 * 6 / 10) <= 2);

    let out = dir.path().join("broadcast.wav");
    composition.audio.write_wav(&out).unwrap();
    let decoded = AudioClip::read_wav(&out).unwrap();
    assert_eq!(decoded.sample_rate, 22_050);
    assert_eq!(decoded.channels, 1);
    assert_eq!(decoded.frames(), composition.audio.frames());
    assert_eq!(decoded.frames(), composition.timeline.total_frames());
}

#[test]
fn ambient_bed_runs_under_the_whole_track() {
    let mut library = SoundLibrary::new();
    library.insert(EffectKey::CatchFast, tone(22_050, 1, 200, 0.0));
    library.insert(EffectKey::Ambient, tone(22_050, 1, 1_000, 0.5));

    let config = BroadcastConfig {
        ambient_enabled: true,
        ..BroadcastConfig::default()
    };
    let mut pipeline = BroadcastPipeline::builder()
        .config(config)
        .seed(2)
        .with_library(library)
        .build()
        .unwrap();
    let narration = AudioClip::silence(22_050, 1, 2_500);
    let composition = pipeline.compose(&narration, &[]);

    assert!(composition.timeline.ambient);
    assert_eq!(composition.audio.frames(), narration.frames());
    let expected = 0.5 * db_to_amplitude(-15.0);
    assert!(composition
        .audio
        .samples
        .iter()
        .all(|s| (s - expected).abs() < 1e-4));
}

#[test]
fn ambient_without_clip_is_skipped() {
    let config = BroadcastConfig {
        ambient_enabled: true,
        ..BroadcastConfig::default()
    };
    let mut pipeline = BroadcastPipeline::builder()
        .config(config)
        .seed(2)
        .with_library(SoundLibrary::new())
        .build()
        .unwrap();
    let narration = AudioClip::silence(22_050, 1, 500);
    let composition = pipeline.compose(&narration, &[]);
    assert!(!composition.timeline.ambient);
    assert_eq!(composition.audio, narration);
}
