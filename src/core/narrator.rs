/// The narration generator: selected pitches in, ordered utterances out.
///
/// Context decisions (boundaries, who gets named) come from the pure
/// [`NarrationState::step`] reducer; the grammar only chooses sentence shape.
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::context::{NarrationState, StepPlan};
use crate::core::grammar::{GrammarError, GrammarSet, SelectionContext};
use crate::core::phrasing::{
    closing_summary, count_phrase, delivery_phrase, half_inning_summary, inning_announcement,
    location_phrase, ordinal, rbi_phrase, surname, AtBatOutcome, PitchOutcome,
};
use crate::core::variety::VarietyPass;
use crate::schema::pitch::{PitchEvent, ScoreLine};
use crate::schema::utterance::{ScoreSummary, Script, Teams, Utterance};

/// Phrasing grammar shipped with the crate.
pub const DEFAULT_GRAMMAR: &str = include_str!("../../genre_data/baseball/grammar.ron");

/// Rules the narrator expands; custom grammars must provide all of them.
pub const PITCH_RULES: [&str; 4] = [
    "pitch_full",
    "pitch_to_batter",
    "pitch_from_pitcher",
    "pitch_anaphoric",
];

/// Fields every pitch rule alternative must speak.
pub const REQUIRED_FIELDS: [&str; 2] = ["pitch", "outcome"];

/// Every `{call.*}` field the narrator binds.
pub const BOUND_FIELDS: [&str; 5] = ["pitcher", "batter", "pitch", "outcome", "inning"];

/// Name fields left unbound for a pitch rule, since the rule is only
/// chosen when those players are not to be mentioned.
pub fn unmentioned_fields(rule: &str) -> &'static [&'static str] {
    match rule {
        "pitch_to_batter" => &["pitcher"],
        "pitch_from_pitcher" => &["batter"],
        "pitch_anaphoric" => &["pitcher", "batter"],
        _ => &[],
    }
}

/// Final result of a game, for the closing recap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub teams: Teams,
    pub score: ScoreLine,
    /// Innings played; more than nine means extra innings.
    pub innings: u32,
    #[serde(default)]
    pub winning_pitcher: Option<String>,
    #[serde(default)]
    pub losing_pitcher: Option<String>,
    #[serde(default)]
    pub save_pitcher: Option<String>,
}

/// Stateful text synthesis over one broadcast.
pub struct Narrator {
    grammar: GrammarSet,
    rng: StdRng,
    variety: VarietyPass,
    announce_count: bool,
}

/// Builder for constructing a `Narrator`.
pub struct NarratorBuilder {
    grammar_files: Vec<PathBuf>,
    seed: Option<u64>,
    announce_count: bool,
    /// Directly provided grammar (for testing without files).
    grammar: Option<GrammarSet>,
}

impl Narrator {
    pub fn builder() -> NarratorBuilder {
        NarratorBuilder {
            grammar_files: Vec::new(),
            seed: None,
            announce_count: false,
            grammar: None,
        }
    }

    /// Narrate the selected events in order.
    ///
    /// Never fails. A non-empty input always ends with one closing score
    /// summary built from the last event's score.
    pub fn generate(&mut self, events: &[PitchEvent], teams: Option<&Teams>) -> Vec<Utterance> {
        let mut utterances = Vec::with_capacity(events.len() + events.len() / 4 + 2);
        let mut state = NarrationState::new();

        for (index, event) in events.iter().enumerate() {
            let (next, plan) = state.step(event);

            if let Some(boundary) = plan.boundary {
                if let Some((closed, score)) = boundary.closing {
                    utterances.push(Utterance::summary(
                        half_inning_summary(closed, score, teams),
                        ScoreSummary {
                            after: closed,
                            score,
                            is_final: false,
                        },
                    ));
                }
                utterances.push(Utterance::announcement(
                    inning_announcement(boundary.opening),
                    boundary.opening,
                ));
            }

            let text = self.narrate_pitch(event, &plan);
            debug!("pitch {}: {}", index, text);
            utterances.push(Utterance::pitch(text, index));
            state = next;
        }

        match events.last() {
            Some(last) => utterances.push(Utterance::summary(
                closing_summary(last.score(), teams),
                ScoreSummary {
                    after: last.marker(),
                    score: last.score(),
                    is_final: true,
                },
            )),
            None => warn!("no events to narrate"),
        }

        self.variety.reset();
        utterances
    }

    /// [`Narrator::generate`] wrapped as a [`Script`].
    pub fn script(&mut self, events: &[PitchEvent], teams: Option<&Teams>) -> Script {
        Script::new(self.generate(events, teams))
    }

    /// Closing lines for a finished game: result, then pitching decisions.
    pub fn recap(&self, result: &GameResult) -> Vec<Utterance> {
        let ScoreLine { away, home } = result.score;
        let (winner, loser, high, low) = if away >= home {
            (&result.teams.away, &result.teams.home, away, home)
        } else {
            (&result.teams.home, &result.teams.away, home, away)
        };

        let headline = if high == low {
            format!("That's the game, and it ends tied at {}.", high)
        } else if result.innings > 9 {
            format!(
                "That's the game. {} wins it in {} innings, {} to {}.",
                winner, result.innings, high, low
            )
        } else {
            format!(
                "That's the game. {} defeats {}, {} to {}.",
                winner, loser, high, low
            )
        };

        let mut lines = vec![Utterance::recap(headline)];
        let decisions = [
            (&result.winning_pitcher, "gets the win"),
            (&result.losing_pitcher, "takes the loss"),
            (&result.save_pitcher, "earns the save"),
        ];
        for (pitcher, verb) in decisions {
            if let Some(name) = pitcher.as_deref().filter(|n| !n.trim().is_empty()) {
                lines.push(Utterance::recap(format!("{} {}.", name.trim(), verb)));
            }
        }
        lines
    }

    fn narrate_pitch(&mut self, event: &PitchEvent, plan: &StepPlan) -> String {
        let outcome = PitchOutcome::classify(&event.result);
        let pitch = match location_phrase(event.px, event.pz) {
            Some(location) => format!("{}, {}", delivery_phrase(event.speed, &event.pitch_type), location),
            None => delivery_phrase(event.speed, &event.pitch_type),
        };
        let pitcher = surname(&event.pitcher);
        let batter = surname(&event.batter);

        let rule = match (plan.mention_pitcher, plan.mention_batter) {
            (true, true) => "pitch_full",
            (false, true) => "pitch_to_batter",
            (true, false) => "pitch_from_pitcher",
            (false, false) => "pitch_anaphoric",
        };

        let mut ctx = SelectionContext::new();
        if plan.mention_pitcher {
            ctx.bind("pitcher", pitcher);
        }
        if plan.mention_batter {
            ctx.bind("batter", batter);
        }
        ctx.bind("pitch", pitch.as_str())
            .bind("outcome", outcome.phrase())
            .bind("inning", ordinal(event.inning))
            .tag(outcome.tag())
            .tag(format!("half:{}", event.half.label()));
        if event.ends_at_bat() {
            ctx.tag("at_bat:final");
        }

        let mut text = match self
            .grammar
            .expand(rule, &ctx, &mut self.rng, &mut self.variety)
        {
            Ok(text) => text,
            Err(e) => {
                warn!("phrasing rule '{}' failed ({}); using plain call", rule, e);
                plain_call(plan, pitcher, batter, &pitch, &outcome.phrase())
            }
        };

        match event.at_bat_event.as_deref().filter(|l| !l.trim().is_empty()) {
            Some(label) => {
                text.push(' ');
                text.push_str(&AtBatOutcome::classify(label).phrase());
                if let Some(rbi) = rbi_phrase(event.rbi) {
                    text.push(' ');
                    text.push_str(&rbi);
                }
            }
            None if self.announce_count => {
                if let Some(count) = count_phrase(event.balls, event.strikes) {
                    text.push(' ');
                    text.push_str(&count);
                }
            }
            None => {}
        }
        text
    }
}

/// Template-free call used when a custom grammar cannot be expanded.
fn plain_call(plan: &StepPlan, pitcher: &str, batter: &str, pitch: &str, outcome: &str) -> String {
    let opener = if plan.mention_pitcher {
        format!("{} delivers", pitcher)
    } else {
        "Delivers".to_string()
    };
    if plan.mention_batter {
        format!("{} {} to {}, {}.", opener, pitch, batter, outcome)
    } else {
        format!("{} {}, {}.", opener, pitch, outcome)
    }
}

impl NarratorBuilder {
    /// Fix the template-choice seed for reproducible phrasing.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Seed when `Some`, entropy when `None`.
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Add a RON grammar file whose rules override the built-in ones.
    pub fn grammar_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.grammar_files.push(path.into());
        self
    }

    /// Speak the ball-strike count after non-terminal pitches.
    pub fn announce_count(mut self, enabled: bool) -> Self {
        self.announce_count = enabled;
        self
    }

    /// Provide the grammar directly instead of the built-in one.
    pub fn with_grammar(mut self, grammar: GrammarSet) -> Self {
        self.grammar = Some(grammar);
        self
    }

    pub fn build(self) -> Result<Narrator, GrammarError> {
        let mut grammar = match self.grammar {
            Some(grammar) => grammar,
            None => GrammarSet::parse_ron(DEFAULT_GRAMMAR)?,
        };
        for path in &self.grammar_files {
            grammar.merge(GrammarSet::load_from_ron(path)?);
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Narrator {
            grammar,
            rng,
            variety: VarietyPass::new(),
            announce_count: self.announce_count,
        })
    }
}
