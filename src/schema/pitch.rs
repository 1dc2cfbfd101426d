use serde::{Deserialize, Serialize};
use std::fmt;

/// Which team is batting: visitors bat in the top, the home team in the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfInning {
    Top,
    Bottom,
}

impl Default for HalfInning {
    fn default() -> Self {
        Self::Top
    }
}

impl HalfInning {
    /// Spoken form: "top" / "bottom".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for HalfInning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn unknown_player() -> String {
    "Unknown".to_string()
}

/// One recorded pitch with its physical and outcome attributes.
///
/// Events are the sole input to the narration pipeline. Missing optional
/// fields deserialize to documented defaults (speed 0, count 0-0, no
/// at-bat outcome, no RBI) rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEvent {
    pub inning: u32,
    #[serde(alias = "half_inning")]
    pub half: HalfInning,
    #[serde(default = "unknown_player")]
    pub batter: String,
    #[serde(default = "unknown_player")]
    pub pitcher: String,
    /// Free-form pitch category, e.g. "Four-Seam Fastball".
    #[serde(default)]
    pub pitch_type: String,
    /// Release speed in mph; 0 means unknown.
    #[serde(default)]
    pub speed: f64,
    /// Horizontal plate location, feet from the center of the plate.
    #[serde(default)]
    pub px: Option<f64>,
    /// Vertical plate location, feet above the ground.
    #[serde(default)]
    pub pz: Option<f64>,
    /// Raw pitch result label, e.g. "Called Strike".
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub balls: u32,
    #[serde(default)]
    pub strikes: u32,
    /// Present only on the pitch that ends an at-bat.
    #[serde(default)]
    pub at_bat_event: Option<String>,
    #[serde(default)]
    pub rbi: u32,
    #[serde(default)]
    pub away_score: u32,
    #[serde(default)]
    pub home_score: u32,
    /// Milliseconds from broadcast start; non-decreasing across a game.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl PitchEvent {
    /// A pitch with every optional attribute at its default.
    pub fn new(
        inning: u32,
        half: HalfInning,
        batter: impl Into<String>,
        pitcher: impl Into<String>,
    ) -> Self {
        Self {
            inning,
            half,
            batter: batter.into(),
            pitcher: pitcher.into(),
            pitch_type: String::new(),
            speed: 0.0,
            px: None,
            pz: None,
            result: String::new(),
            balls: 0,
            strikes: 0,
            at_bat_event: None,
            rbi: 0,
            away_score: 0,
            home_score: 0,
            timestamp_ms: 0,
        }
    }

    /// The (inning, half) this pitch belongs to.
    pub fn marker(&self) -> InningMarker {
        InningMarker {
            inning: self.inning,
            half: self.half,
        }
    }

    /// Cumulative score at the time of this pitch.
    pub fn score(&self) -> ScoreLine {
        ScoreLine {
            away: self.away_score,
            home: self.home_score,
        }
    }

    /// True when this pitch carries a terminal at-bat outcome.
    pub fn ends_at_bat(&self) -> bool {
        self.at_bat_event
            .as_deref()
            .map(|label| !label.trim().is_empty())
            .unwrap_or(false)
    }
}

/// A half-inning position in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InningMarker {
    pub inning: u32,
    pub half: HalfInning,
}

/// Cumulative away/home runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScoreLine {
    pub away: u32,
    pub home: u32,
}
