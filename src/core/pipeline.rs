/// The broadcast pipeline: events → script → narration audio → mixed track.
///
/// Wires together event selection, narration, synthesis, effect selection
/// and compositing. Single-threaded; the only blocking step is the provider
/// call inside synthesis.
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::audio::clip::{AudioClip, AudioError};
use crate::audio::compositor::{Composition, Compositor, EffectCue};
use crate::audio::library::SoundLibrary;
use crate::config::{BroadcastConfig, ConfigError};
use crate::core::effects::EffectRules;
use crate::core::grammar::{GrammarError, GrammarSet};
use crate::core::narrator::{GameResult, Narrator};
use crate::core::selector::{select_with, SelectionMode};
use crate::schema::pitch::PitchEvent;
use crate::schema::utterance::{Script, Teams};
use crate::synth::timing::estimate_cues;
use crate::synth::{synthesize_chunked, SpeechSynthesizer, SynthesisError};

/// Keeps the effect rng stream apart from the phrasing stream for one seed.
const EFFECT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("no events selected; nothing to broadcast")]
    NoContent,
}

/// Everything one broadcast run produced.
///
/// The script is always present; audio failures only affect `audio`.
#[derive(Debug)]
pub struct BroadcastOutcome {
    pub selected: Vec<PitchEvent>,
    pub script: Script,
    pub audio: Result<Composition, PipelineError>,
}

/// The top-level broadcast producer. Built via `BroadcastPipeline::builder()`.
pub struct BroadcastPipeline {
    config: BroadcastConfig,
    mode: SelectionMode,
    narrator: Narrator,
    library: SoundLibrary,
    effect_rules: EffectRules,
    result: Option<GameResult>,
    rng: StdRng,
}

/// Builder for constructing a `BroadcastPipeline`.
pub struct BroadcastPipelineBuilder {
    config: Option<BroadcastConfig>,
    config_path: Option<PathBuf>,
    mode: Option<SelectionMode>,
    seed: Option<u64>,
    grammar_files: Vec<PathBuf>,
    result: Option<GameResult>,
    /// Directly provided grammar (for testing without files).
    grammar: Option<GrammarSet>,
    /// Directly provided sound library (for testing without files).
    library: Option<SoundLibrary>,
}

impl BroadcastPipeline {
    pub fn builder() -> BroadcastPipelineBuilder {
        BroadcastPipelineBuilder {
            config: None,
            config_path: None,
            mode: None,
            seed: None,
            grammar_files: Vec::new(),
            result: None,
            grammar: None,
            library: None,
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    /// Reduce a full game to the pitches that will be narrated.
    pub fn select(&self, events: &[PitchEvent]) -> Vec<PitchEvent> {
        let selected = select_with(events, &self.mode, &self.config.sample_policy());
        info!("selected {} of {} events", selected.len(), events.len());
        selected
    }

    /// Narrate already-selected events, plus the recap when a result is set.
    pub fn narrate(&mut self, selected: &[PitchEvent], teams: Option<&Teams>) -> Script {
        let mut script = self.narrator.script(selected, teams);
        if let Some(result) = &self.result {
            script.utterances.extend(self.narrator.recap(result));
        }
        script
    }

    /// Effect cues for each narrated pitch, timed against the narration audio.
    pub fn effect_cues(
        &mut self,
        selected: &[PitchEvent],
        script: &Script,
        narration_ms: u64,
    ) -> Vec<EffectCue> {
        estimate_cues(script, narration_ms, self.config.words_per_minute)
            .into_iter()
            .filter_map(|mark| {
                let event = selected.get(mark.event_index)?;
                Some(EffectCue {
                    offset_ms: mark.offset_ms,
                    effects: self.effect_rules.select(event, &mut self.rng),
                })
            })
            .collect()
    }

    /// Mix narration audio with effect cues and the optional ambient bed.
    pub fn compose(&mut self, narration: &AudioClip, cues: &[EffectCue]) -> Composition {
        Compositor::new(&self.library, self.config.mix_settings()).compose(
            narration,
            cues,
            &mut self.rng,
        )
    }

    /// Synthesize the script and build the final mix.
    pub fn render<S: SpeechSynthesizer + ?Sized>(
        &mut self,
        selected: &[PitchEvent],
        script: &Script,
        synth: &mut S,
    ) -> Result<Composition, PipelineError> {
        if script.is_empty() {
            return Err(PipelineError::NoContent);
        }
        let max_len = match synth.max_text_len() {
            0 => self.config.max_chunk_chars,
            provider => provider,
        };
        let narration = synthesize_chunked(synth, &script.to_text(), max_len)?;
        let cues = self.effect_cues(selected, script, narration.duration_ms());
        Ok(self.compose(&narration, &cues))
    }

    /// Run the whole broadcast. Never fails as a whole: the script is
    /// returned even when synthesis or mixing does not succeed.
    pub fn produce<S: SpeechSynthesizer + ?Sized>(
        &mut self,
        events: &[PitchEvent],
        teams: Option<&Teams>,
        synth: &mut S,
    ) -> BroadcastOutcome {
        let selected = self.select(events);
        let script = self.narrate(&selected, teams);
        let audio = self.render(&selected, &script, synth);
        match &audio {
            Ok(composition) => info!(
                "broadcast ready: {} utterances, {} ms",
                script.utterances.len(),
                composition.audio.duration_ms()
            ),
            Err(e) => warn!("broadcast audio unavailable: {}", e),
        }
        BroadcastOutcome {
            selected,
            script,
            audio,
        }
    }
}

impl BroadcastPipelineBuilder {
    /// Use this configuration instead of the defaults.
    pub fn config(mut self, config: BroadcastConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from a RON file at build time.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Override the configured seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Narrate only these innings; an empty set narrates everything.
    pub fn key_innings(mut self, innings: BTreeSet<u32>) -> Self {
        self.mode = Some(SelectionMode::KeyInnings(innings));
        self
    }

    /// Explicit selection mode. Defaults to sampling past `max_events`.
    pub fn selection(mut self, mode: SelectionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Close the broadcast with a game recap.
    pub fn game_result(mut self, result: GameResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Add a RON grammar file whose rules override the built-in ones.
    pub fn grammar_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.grammar_files.push(path.into());
        self
    }

    /// Provide the grammar directly.
    pub fn with_grammar(mut self, grammar: GrammarSet) -> Self {
        self.grammar = Some(grammar);
        self
    }

    /// Provide the sound library directly instead of loading `sound_dir`.
    pub fn with_library(mut self, library: SoundLibrary) -> Self {
        self.library = Some(library);
        self
    }

    pub fn build(self) -> Result<BroadcastPipeline, PipelineError> {
        let mut config = match (self.config, &self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => BroadcastConfig::load_from_ron(path)?,
            (None, None) => BroadcastConfig::default(),
        };
        config.validate()?;
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        let mut narrator = Narrator::builder()
            .maybe_seed(config.seed)
            .announce_count(config.announce_count);
        if let Some(grammar) = self.grammar {
            narrator = narrator.with_grammar(grammar);
        }
        for path in self.grammar_files {
            narrator = narrator.grammar_file(path);
        }
        let narrator = narrator.build()?;

        let library = match (self.library, &config.sound_dir) {
            (Some(library), _) => library,
            (None, Some(dir)) => SoundLibrary::load(dir),
            (None, None) => {
                warn!("no sound directory configured; effects disabled");
                SoundLibrary::new()
            }
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ EFFECT_SEED_SALT),
            None => StdRng::from_entropy(),
        };

        let mode = self.mode.unwrap_or(SelectionMode::Sample {
            max_events: config.max_events,
        });

        Ok(BroadcastPipeline {
            effect_rules: config.effect_rules(),
            config,
            mode,
            narrator,
            library,
            result: self.result,
            rng,
        })
    }
}
