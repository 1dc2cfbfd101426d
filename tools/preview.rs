/// Preview: interactive shell for trying selections, phrasing and mixes.
///
/// Usage: preview --events <game.ron> [--config <path>] [--grammar <path>]
///                [--sounds <dir>] [--seed <n>]
///
/// Commands:
///   script                   narrate the current selection
///   all | sample             select every event / sample long games
///   innings <n,n,..>         select key innings
///   scoring                  select innings where a run scored
///   half <n> <top|bottom>    select one half-inning
///   teams <away> <home>      name the teams in score summaries
///   effects                  list effect cues for the current selection
///   render <out.wav>         mix with paced silence as narration
///   seed <n>                 set RNG seed
///   help                     list commands
///   quit                     exit
use pitchcast::audio::library::SoundLibrary;
use pitchcast::config::BroadcastConfig;
use pitchcast::core::pipeline::BroadcastPipeline;
use pitchcast::core::selector::{scoring_innings, SelectionMode};
use pitchcast::schema::pitch::{HalfInning, PitchEvent};
use pitchcast::schema::utterance::{Teams, UtteranceKind};
use pitchcast::source::{EventSource, RonEventSource};
use pitchcast::synth::timing::estimate_duration_ms;
use pitchcast::synth::PacedSilence;
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

struct Session {
    events: Vec<PitchEvent>,
    config: BroadcastConfig,
    grammar: Option<PathBuf>,
    library: SoundLibrary,
    mode: SelectionMode,
    teams: Option<Teams>,
}

impl Session {
    fn pipeline(&self) -> Option<BroadcastPipeline> {
        let mut builder = BroadcastPipeline::builder()
            .config(self.config.clone())
            .selection(self.mode.clone())
            .with_library(self.library.clone());
        if let Some(path) = &self.grammar {
            builder = builder.grammar_file(path.clone());
        }
        match builder.build() {
            Ok(pipeline) => Some(pipeline),
            Err(e) => {
                println!("Cannot build pipeline: {}", e);
                None
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut events_path = None;
    let mut config_path = None;
    let mut grammar = None;
    let mut sounds = None;
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--events" if i + 1 < args.len() => {
                i += 1;
                events_path = Some(PathBuf::from(&args[i]));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(PathBuf::from(&args[i]));
            }
            "--grammar" if i + 1 < args.len() => {
                i += 1;
                grammar = Some(PathBuf::from(&args[i]));
            }
            "--sounds" if i + 1 < args.len() => {
                i += 1;
                sounds = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().ok();
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(events_path) = events_path else {
        eprintln!("--events is required");
        print_usage();
        std::process::exit(1);
    };

    let mut config = match config_path {
        Some(path) => match BroadcastConfig::load_from_ron(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => BroadcastConfig::default(),
    };
    config.seed = seed.or(config.seed).or(Some(42));
    if sounds.is_some() {
        config.sound_dir = sounds;
    }

    let events = load_events(&events_path);
    let library = match &config.sound_dir {
        Some(dir) => SoundLibrary::load(dir),
        None => SoundLibrary::new(),
    };

    println!("Loaded {} events", events.len());
    println!("Effects available: {}", library.keys().count());
    println!("Seed: {}", config.seed.unwrap_or_default());
    println!("Type 'help' for commands.\n");

    let mut session = Session {
        mode: SelectionMode::Sample {
            max_events: config.max_events,
        },
        events,
        config,
        grammar,
        library,
        teams: None,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "all" => {
                session.mode = SelectionMode::All;
                println!("Selecting every event.");
            }
            "sample" => {
                session.mode = SelectionMode::Sample {
                    max_events: session.config.max_events,
                };
                println!("Sampling games longer than {} events.", session.config.max_events);
            }
            "innings" => {
                let innings: BTreeSet<u32> = parts
                    .get(1)
                    .map(|list| list.split(',').filter_map(|n| n.trim().parse().ok()).collect())
                    .unwrap_or_default();
                println!("Key innings: {:?}", innings);
                session.mode = SelectionMode::KeyInnings(innings);
            }
            "scoring" => {
                let innings = scoring_innings(&session.events);
                println!("Scoring innings: {:?}", innings);
                session.mode = SelectionMode::KeyInnings(innings);
            }
            "half" => {
                let inning = parts.get(1).and_then(|n| n.parse().ok());
                let half = match parts.get(2).map(|h| h.to_lowercase()) {
                    Some(h) if h == "top" => Some(HalfInning::Top),
                    Some(h) if h == "bottom" => Some(HalfInning::Bottom),
                    _ => None,
                };
                match (inning, half) {
                    (Some(inning), Some(half)) => {
                        session.mode = SelectionMode::HalfInning { inning, half };
                        println!("Selecting the {} of inning {}.", half, inning);
                    }
                    _ => println!("Usage: half <n> <top|bottom>"),
                }
            }
            "teams" => {
                if parts.len() < 3 {
                    println!("Usage: teams <away> <home>");
                    continue;
                }
                session.teams = Some(Teams::new(parts[1], parts[2]));
                println!("Teams: {} at {}", parts[1], parts[2]);
            }
            "seed" => match parts.get(1).and_then(|s| s.parse().ok()) {
                Some(n) => {
                    session.config.seed = Some(n);
                    println!("Seed set to {}", n);
                }
                None => println!("Usage: seed <n>"),
            },
            "script" => {
                let Some(mut pipeline) = session.pipeline() else {
                    continue;
                };
                let selected = pipeline.select(&session.events);
                let script = pipeline.narrate(&selected, session.teams.as_ref());
                println!();
                for utterance in &script.utterances {
                    match utterance.kind {
                        UtteranceKind::InningAnnouncement => println!("\n== {}", utterance.text),
                        UtteranceKind::ScoreSummary => println!("   [{}]", utterance.text),
                        _ => println!("   {}", utterance.text),
                    }
                }
                println!(
                    "\n{} events, {} words, ~{} s at {} wpm\n",
                    selected.len(),
                    script.word_count(),
                    estimate_duration_ms(&script, session.config.words_per_minute) / 1000,
                    session.config.words_per_minute
                );
            }
            "effects" => {
                let Some(mut pipeline) = session.pipeline() else {
                    continue;
                };
                let selected = pipeline.select(&session.events);
                let script = pipeline.narrate(&selected, session.teams.as_ref());
                for cue in pipeline.effect_cues(&selected, &script, 0) {
                    let names: Vec<String> = cue.effects.iter().map(|k| k.to_string()).collect();
                    println!("{:>8} ms  {}", cue.offset_ms, names.join(" + "));
                }
            }
            "render" => {
                let Some(out) = parts.get(1) else {
                    println!("Usage: render <out.wav>");
                    continue;
                };
                let Some(mut pipeline) = session.pipeline() else {
                    continue;
                };
                let mut synth = PacedSilence {
                    words_per_minute: session.config.words_per_minute,
                    max_text_len: session.config.max_chunk_chars,
                    ..PacedSilence::default()
                };
                let outcome = pipeline.produce(&session.events, session.teams.as_ref(), &mut synth);
                match outcome.audio {
                    Ok(composition) => {
                        println!(
                            "{} segments, {} ms",
                            composition.timeline.segments.len(),
                            composition.audio.duration_ms()
                        );
                        if let Err(e) = composition.audio.write_wav(Path::new(out)) {
                            println!("Write failed: {}", e);
                        }
                    }
                    Err(e) => println!("Render failed: {}", e),
                }
            }
            _ => println!("Unknown command: {}. Type 'help' for commands.", cmd),
        }
    }
}

fn load_events(path: &Path) -> Vec<PitchEvent> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let game_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    RonEventSource::new(dir).fetch(&game_id)
}

fn print_usage() {
    println!("Usage: preview --events <game.ron> [--config <path>] [--grammar <path>]");
    println!("               [--sounds <dir>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  script                   narrate the current selection");
    println!("  all | sample             select every event / sample long games");
    println!("  innings <n,n,..>         select key innings");
    println!("  scoring                  select innings where a run scored");
    println!("  half <n> <top|bottom>    select one half-inning");
    println!("  teams <away> <home>      name the teams in score summaries");
    println!("  effects                  list effect cues for the current selection");
    println!("  render <out.wav>         mix with paced silence as narration");
    println!("  seed <n>                 set RNG seed");
    println!("  help                     list commands");
    println!("  quit                     exit");
}
