/// Event sources: where a game's pitch list comes from.
use log::{info, warn};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

use crate::schema::pitch::PitchEvent;

/// Supplies the ordered pitch list for a game.
///
/// Failures are not errors: a source that cannot deliver returns an empty
/// list, which the rest of the pipeline treats as "no broadcast content".
pub trait EventSource {
    fn fetch(&self, game_id: &str) -> Vec<PitchEvent>;
}

/// Reads `<dir>/<game_id>.ron`, a RON list of pitch records.
#[derive(Debug, Clone)]
pub struct RonEventSource {
    dir: PathBuf,
}

impl RonEventSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, game_id: &str) -> PathBuf {
        self.dir.join(format!("{}.ron", game_id))
    }
}

impl EventSource for RonEventSource {
    fn fetch(&self, game_id: &str) -> Vec<PitchEvent> {
        let path = self.path_for(game_id);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("cannot read events for game {} ({}): {}", game_id, path.display(), e);
                return Vec::new();
            }
        };
        match ron::from_str::<Vec<PitchEvent>>(&contents) {
            Ok(events) => {
                info!("loaded {} events for game {}", events.len(), game_id);
                in_time_order(events)
            }
            Err(e) => {
                warn!("malformed events for game {}: {}", game_id, e);
                Vec::new()
            }
        }
    }
}

/// In-memory games, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticEventSource {
    games: FxHashMap<String, Vec<PitchEvent>>,
}

impl StaticEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game(mut self, game_id: impl Into<String>, events: Vec<PitchEvent>) -> Self {
        self.games.insert(game_id.into(), events);
        self
    }
}

impl EventSource for StaticEventSource {
    fn fetch(&self, game_id: &str) -> Vec<PitchEvent> {
        match self.games.get(game_id) {
            Some(events) => in_time_order(events.clone()),
            None => {
                warn!("unknown game {}", game_id);
                Vec::new()
            }
        }
    }
}

/// Stable sort by timestamp; equal timestamps keep record order.
fn in_time_order(mut events: Vec<PitchEvent>) -> Vec<PitchEvent> {
    events.sort_by_key(|e| e.timestamp_ms);
    events
}
