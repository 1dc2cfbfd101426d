/// Broadcast context: who is up, who is pitching, and where we are in the game.
///
/// The state is threaded through a pure step function, one event at a time,
/// so every naming and boundary decision can be tested without touching the
/// phrasing grammar or its randomness.
use crate::schema::pitch::{InningMarker, PitchEvent, ScoreLine};

/// Context carried from one event to the next during a single generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrationState {
    /// Half-inning of the previous event.
    pub marker: Option<InningMarker>,
    /// Batter last introduced; cleared when a ball is put in play.
    pub batter: Option<String>,
    /// Pitcher of record for the current half-inning.
    pub pitcher: Option<String>,
    /// Cumulative score as of the previous event.
    pub score: ScoreLine,
}

/// A half-inning change detected before an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    /// The half-inning being closed, with its last known score.
    pub closing: Option<(InningMarker, ScoreLine)>,
    pub opening: InningMarker,
}

/// Everything deterministic about how one event is narrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    pub boundary: Option<Boundary>,
    pub mention_pitcher: bool,
    pub mention_batter: bool,
}

impl NarrationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the context by one event.
    ///
    /// Returns the next state and the plan for narrating `event`. A
    /// half-inning change resets the tracked batter and pitcher; the closing
    /// summary uses the score as of the previous event, not this one.
    pub fn step(&self, event: &PitchEvent) -> (NarrationState, StepPlan) {
        let marker = event.marker();
        let mut next = self.clone();

        let boundary = if self.marker != Some(marker) {
            next.batter = None;
            next.pitcher = None;
            Some(Boundary {
                closing: self.marker.map(|previous| (previous, self.score)),
                opening: marker,
            })
        } else {
            None
        };

        let mention_pitcher = next.pitcher.as_deref() != Some(event.pitcher.as_str());
        let mention_batter = next.batter.as_deref() != Some(event.batter.as_str());

        next.marker = Some(marker);
        next.pitcher = Some(event.pitcher.clone());
        next.batter = if is_ball_in_play(&event.result) {
            None
        } else {
            Some(event.batter.clone())
        };
        next.score = event.score();

        (
            next,
            StepPlan {
                boundary,
                mention_pitcher,
                mention_batter,
            },
        )
    }
}

/// True when the raw result label says the ball was put in play.
pub fn is_ball_in_play(result: &str) -> bool {
    let lower = result.to_lowercase();
    lower.contains("in play") || lower.contains("hit")
}
