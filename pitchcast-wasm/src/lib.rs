//! WASM bindings for pitchcast: powers the in-browser script preview.
//!
//! Audio stays on the host side: the browser gets the script, the selected
//! events and the effect keys per pitch, and plays its own clips.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use pitchcast::core::effects::select_effects;
use pitchcast::core::narrator::Narrator;
use pitchcast::core::selector::{scoring_innings, select, SelectionMode};
use pitchcast::schema::effect::EffectKey;
use pitchcast::schema::pitch::PitchEvent;
use pitchcast::schema::utterance::{Teams, Utterance};
use pitchcast::synth::timing::{estimate_cues, DEFAULT_WORDS_PER_MINUTE};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize, Default)]
struct SelectionInput {
    /// Explicit key innings; takes precedence over the other options.
    #[serde(default)]
    innings: Option<Vec<u32>>,
    /// Narrate only innings where a run scored.
    #[serde(default)]
    scoring_only: bool,
    /// Sample games longer than this many events.
    #[serde(default)]
    max_events: Option<usize>,
}

#[derive(serde::Serialize)]
struct CueInfo {
    event_index: usize,
    offset_ms: u64,
    effects: Vec<EffectKey>,
}

#[derive(serde::Serialize)]
struct BroadcastInfo {
    selected: usize,
    utterances: Vec<Utterance>,
    text: String,
    cues: Vec<CueInfo>,
}

fn parse_events(events_json: &str) -> Result<Vec<PitchEvent>, JsError> {
    serde_json::from_str(events_json).map_err(|e| JsError::new(&format!("Invalid events JSON: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// Demo wrapper
// ---------------------------------------------------------------------------

/// A seeded narrator plus effect rng, reusable across calls.
#[wasm_bindgen]
pub struct BroadcastDemo {
    narrator: Narrator,
    rng: StdRng,
    teams: Option<Teams>,
    seed: u64,
}

#[wasm_bindgen]
impl BroadcastDemo {
    /// Create a demo instance with the built-in grammar and a fixed seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<BroadcastDemo, JsError> {
        let narrator = Narrator::builder()
            .seed(seed)
            .build()
            .map_err(|e| JsError::new(&format!("Narrator build error: {e}")))?;
        Ok(BroadcastDemo {
            narrator,
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            teams: None,
            seed,
        })
    }

    /// Name the teams used in score summaries. Empty strings clear them.
    pub fn set_teams(&mut self, away: &str, home: &str) {
        self.teams = if away.is_empty() || home.is_empty() {
            None
        } else {
            Some(Teams::new(away, home))
        };
    }

    /// Narrate a game given as a JSON array of pitch records.
    ///
    /// `selection_json` may be empty or an object such as
    /// `{"innings": [7, 8, 9]}`, `{"scoring_only": true}` or
    /// `{"max_events": 50}`. Returns the script, its plain text and the
    /// estimated effect cues as JSON.
    pub fn broadcast(&mut self, events_json: &str, selection_json: &str) -> Result<String, JsError> {
        let events = parse_events(events_json)?;
        let selection: SelectionInput = if selection_json.trim().is_empty() {
            SelectionInput::default()
        } else {
            serde_json::from_str(selection_json)
                .map_err(|e| JsError::new(&format!("Invalid selection JSON: {e}")))?
        };

        let mode = if let Some(innings) = selection.innings {
            SelectionMode::KeyInnings(innings.into_iter().collect::<BTreeSet<u32>>())
        } else if selection.scoring_only {
            SelectionMode::KeyInnings(scoring_innings(&events))
        } else {
            SelectionMode::Sample {
                max_events: selection.max_events.unwrap_or(50),
            }
        };

        let selected = select(&events, &mode);
        let script = self.narrator.script(&selected, self.teams.as_ref());
        let cues = estimate_cues(&script, 0, DEFAULT_WORDS_PER_MINUTE)
            .into_iter()
            .filter_map(|mark| {
                let event = selected.get(mark.event_index)?;
                Some(CueInfo {
                    event_index: mark.event_index,
                    offset_ms: mark.offset_ms,
                    effects: select_effects(event, &mut self.rng),
                })
            })
            .collect();

        to_json(&BroadcastInfo {
            selected: selected.len(),
            text: script.to_text(),
            utterances: script.utterances,
            cues,
        })
    }

    /// Effect keys for a single pitch record given as JSON.
    pub fn effects(&mut self, event_json: &str) -> Result<String, JsError> {
        let event: PitchEvent = serde_json::from_str(event_json)
            .map_err(|e| JsError::new(&format!("Invalid event JSON: {e}")))?;
        to_json(&select_effects(&event, &mut self.rng))
    }

    /// Return JSON array of every effect key's file stem.
    pub fn effect_keys() -> String {
        let stems: Vec<&str> = EffectKey::ALL.iter().map(|k| k.file_stem()).collect();
        serde_json::to_string(&stems).unwrap_or_else(|_| "[]".to_string())
    }

    /// Reset the narrator and effect rng with a new seed.
    pub fn reset(&mut self, seed: u64) -> Result<(), JsError> {
        let fresh = BroadcastDemo::new(seed)?;
        self.narrator = fresh.narrator;
        self.rng = fresh.rng;
        self.seed = seed;
        Ok(())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
