/// Deterministic phrase building: everything the narrator says that does
/// not depend on template choice.
use crate::schema::pitch::{HalfInning, InningMarker, ScoreLine};
use crate::schema::utterance::Teams;

/// Horizontal distance from center (feet) beyond which a pitch is inside/outside.
pub const HORIZONTAL_EDGE: f64 = 0.7;
/// Height (feet) above which a pitch is called high.
pub const HIGH_ABOVE: f64 = 3.5;
/// Height (feet) below which a pitch is called low.
pub const LOW_BELOW: f64 = 1.5;

const NAME_SUFFIXES: &[&str] = &["jr.", "jr", "sr.", "sr", "ii", "iii", "iv"];

/// The name a broadcaster would use on second reference: the surname.
///
/// "Ronald Acuña Jr." → "Acuña"; a single-token name is returned as-is.
pub fn surname(full_name: &str) -> &str {
    let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
    while tokens.len() > 1 {
        let last = tokens[tokens.len() - 1].trim_end_matches(',');
        if NAME_SUFFIXES.contains(&last.to_lowercase().as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }
    tokens
        .last()
        .map(|t| t.trim_end_matches(','))
        .unwrap_or(full_name)
}

/// Speed rounded to a tenth with a trailing ".0" dropped; `None` when unknown.
pub fn speed_figure(speed: f64) -> Option<String> {
    if !speed.is_finite() || speed <= 0.0 {
        return None;
    }
    let tenth = format!("{:.1}", speed);
    Some(match tenth.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => tenth,
    })
}

/// Normalized pitch category: lower-cased, "pitch" when missing.
pub fn pitch_label(pitch_type: &str) -> String {
    let label = pitch_type.trim().to_lowercase();
    if label.is_empty() || label == "unknown" {
        "pitch".to_string()
    } else {
        label
    }
}

/// "a 98.5 mile per hour fastball", "an 84 mile per hour slider", "a curveball".
pub fn delivery_phrase(speed: f64, pitch_type: &str) -> String {
    let label = pitch_label(pitch_type);
    match speed_figure(speed) {
        Some(figure) => format!(
            "{} {} mile per hour {}",
            number_article(&figure),
            figure,
            label
        ),
        None => format!("{} {}", word_article(&label), label),
    }
}

fn number_article(figure: &str) -> &'static str {
    let whole = figure.split('.').next().unwrap_or(figure);
    if whole.starts_with('8') || whole == "11" || whole == "18" {
        "an"
    } else {
        "a"
    }
}

fn word_article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Horizontal plate band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalBand {
    Inside,
    Middle,
    Outside,
}

/// Vertical plate band; `None` in the central range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalBand {
    High,
    Low,
}

pub fn horizontal_band(px: f64) -> HorizontalBand {
    if px < -HORIZONTAL_EDGE {
        HorizontalBand::Inside
    } else if px > HORIZONTAL_EDGE {
        HorizontalBand::Outside
    } else {
        HorizontalBand::Middle
    }
}

pub fn vertical_band(pz: f64) -> Option<VerticalBand> {
    if pz > HIGH_ABOVE {
        Some(VerticalBand::High)
    } else if pz < LOW_BELOW {
        Some(VerticalBand::Low)
    } else {
        None
    }
}

/// Spoken plate location, e.g. "high and inside", "low", "down the middle".
///
/// The middle horizontal band is only spoken when no vertical band applies.
pub fn location_phrase(px: Option<f64>, pz: Option<f64>) -> Option<String> {
    let horizontal = px.filter(|v| v.is_finite()).map(horizontal_band);
    let vertical = pz.filter(|v| v.is_finite()).and_then(vertical_band);

    let side = match horizontal {
        Some(HorizontalBand::Inside) => Some("inside"),
        Some(HorizontalBand::Outside) => Some("outside"),
        Some(HorizontalBand::Middle) | None => None,
    };
    let height = vertical.map(|v| match v {
        VerticalBand::High => "high",
        VerticalBand::Low => "low",
    });

    match (height, side, horizontal) {
        (Some(h), Some(s), _) => Some(format!("{} and {}", h, s)),
        (Some(h), None, _) => Some(h.to_string()),
        (None, Some(s), _) => Some(s.to_string()),
        (None, None, Some(HorizontalBand::Middle)) => Some("down the middle".to_string()),
        (None, None, _) => None,
    }
}

/// How a called or swinging strike was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeKind {
    Called,
    Swinging,
    Foul,
    FoulTip,
    Plain,
}

/// Normalized pitch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PitchOutcome {
    Ball,
    Strike(StrikeKind),
    InPlay,
    /// Anything unrecognized, passed through lower-cased.
    Other(String),
}

impl PitchOutcome {
    /// Keyword classification of a raw result label, checked in order:
    /// "ball", then "strike"/"foul", then "hit"/"in play".
    pub fn classify(result: &str) -> PitchOutcome {
        let lower = result.trim().to_lowercase();
        if lower.contains("ball") {
            PitchOutcome::Ball
        } else if lower.contains("strike") || lower.contains("foul") {
            let kind = if lower.contains("called") {
                StrikeKind::Called
            } else if lower.contains("swing") {
                StrikeKind::Swinging
            } else if lower.contains("tip") {
                StrikeKind::FoulTip
            } else if lower.contains("foul") {
                StrikeKind::Foul
            } else {
                StrikeKind::Plain
            };
            PitchOutcome::Strike(kind)
        } else if lower.contains("hit") || lower.contains("in play") {
            PitchOutcome::InPlay
        } else {
            PitchOutcome::Other(lower)
        }
    }

    /// Phrase used after the delivery, e.g. "called strike".
    pub fn phrase(&self) -> String {
        match self {
            Self::Ball => "ball".to_string(),
            Self::Strike(StrikeKind::Called) => "called strike".to_string(),
            Self::Strike(StrikeKind::Swinging) => "swinging strike".to_string(),
            Self::Strike(StrikeKind::Foul) => "fouled away".to_string(),
            Self::Strike(StrikeKind::FoulTip) => "foul tip".to_string(),
            Self::Strike(StrikeKind::Plain) => "strike".to_string(),
            Self::InPlay => "put in play".to_string(),
            Self::Other(raw) if raw.is_empty() => "no call".to_string(),
            Self::Other(raw) => raw.clone(),
        }
    }

    /// Grammar tag describing the outcome, e.g. "outcome:ball".
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ball => "outcome:ball",
            Self::Strike(_) => "outcome:strike",
            Self::InPlay => "outcome:in_play",
            Self::Other(_) => "outcome:other",
        }
    }
}

/// Normalized terminal outcome of an at-bat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtBatOutcome {
    Strikeout,
    Walk,
    HomeRun,
    Double,
    Triple,
    Single,
    Groundout,
    Flyout,
    Lineout,
    Popout,
    SacFly,
    DoublePlay,
    TriplePlay,
    Error,
    Other(String),
}

impl AtBatOutcome {
    /// Classify a raw at-bat label such as "Home Run" or "Grounded Into DP".
    ///
    /// Keywords are checked most specific first ("double play" before
    /// "double", "triple play" before "triple"), against the label with case and punctuation removed.
    pub fn classify(label: &str) -> AtBatOutcome {
        let compact: String = label
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        let has = |needles: &[&str]| needles.iter().any(|n| compact.contains(n));

        if has(&["tripleplay", "intotp"]) {
            AtBatOutcome::TriplePlay
        } else if has(&["doubleplay", "intodp"]) {
            AtBatOutcome::DoublePlay
        } else if has(&["sacfly", "sacrificefly"]) {
            AtBatOutcome::SacFly
        } else if has(&["homerun", "homer"]) {
            AtBatOutcome::HomeRun
        } else if has(&["triple"]) {
            AtBatOutcome::Triple
        } else if has(&["double"]) {
            AtBatOutcome::Double
        } else if has(&["single"]) {
            AtBatOutcome::Single
        } else if has(&["strikeout", "struckout"]) {
            AtBatOutcome::Strikeout
        } else if has(&["walk", "baseonballs"]) {
            AtBatOutcome::Walk
        } else if has(&["groundout", "groundedout", "forceout"]) {
            AtBatOutcome::Groundout
        } else if has(&["flyout", "fliedout"]) {
            AtBatOutcome::Flyout
        } else if has(&["lineout", "linedout"]) {
            AtBatOutcome::Lineout
        } else if has(&["popout", "poppedout"]) {
            AtBatOutcome::Popout
        } else if has(&["error"]) {
            AtBatOutcome::Error
        } else {
            AtBatOutcome::Other(label.trim().to_string())
        }
    }

    /// Short dramatic sentence appended to the terminal pitch.
    pub fn phrase(&self) -> String {
        match self {
            Self::Strikeout => "Strike three, and that's a strikeout!".to_string(),
            Self::Walk => "Ball four, and that's a walk.".to_string(),
            Self::HomeRun => "That ball is high, it is far, it is gone! A home run!".to_string(),
            Self::Double => "Into the gap, and that's a double!".to_string(),
            Self::Triple => "All the way around to third, a triple!".to_string(),
            Self::Single => "Lined into the outfield for a base hit.".to_string(),
            Self::Groundout => "Grounded out.".to_string(),
            Self::Flyout => "Lifted in the air, and it's caught for the out.".to_string(),
            Self::Lineout => "Lined right at a fielder for the out.".to_string(),
            Self::Popout => "Popped up, and that's an easy out.".to_string(),
            Self::SacFly => "Deep enough for a sacrifice fly.".to_string(),
            Self::DoublePlay => "Turned into a double play!".to_string(),
            Self::TriplePlay => "Around the horn, and that's a triple play!".to_string(),
            Self::Error => "And the defense commits an error.".to_string(),
            Self::Other(raw) => sentence(raw),
        }
    }

    /// Outcomes that bring the crowd to its feet.
    pub fn is_base_hit(&self) -> bool {
        matches!(
            self,
            Self::HomeRun | Self::Single | Self::Double | Self::Triple
        )
    }
}

/// "That brings in a run." / "That brings in N runs." / nothing for zero.
pub fn rbi_phrase(rbi: u32) -> Option<String> {
    match rbi {
        0 => None,
        1 => Some("That brings in a run.".to_string()),
        n => Some(format!("That brings in {} runs.", n)),
    }
}

/// "The count is 2 and 1.", or nothing at 0-0.
pub fn count_phrase(balls: u32, strikes: u32) -> Option<String> {
    if balls == 0 && strikes == 0 {
        None
    } else {
        Some(format!("The count is {} and {}.", balls, strikes))
    }
}

/// 1 → "1st", 2 → "2nd", 11 → "11th", 23 → "23rd".
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// "Top of the 5th." / "Bottom of the 5th."
pub fn inning_announcement(marker: InningMarker) -> String {
    let half = match marker.half {
        HalfInning::Top => "Top",
        HalfInning::Bottom => "Bottom",
    };
    format!("{} of the {}.", half, ordinal(marker.inning))
}

/// "the top of the 3rd"
pub fn half_inning_name(marker: InningMarker) -> String {
    format!("the {} of the {}", marker.half.label(), ordinal(marker.inning))
}

/// Who is ahead: "Boston leads 4 to 2", "we're tied at 3",
/// or "the visitors lead 4 to 2" when team names are unknown.
pub fn score_phrase(score: ScoreLine, teams: Option<&Teams>) -> String {
    use std::cmp::Ordering;

    match score.away.cmp(&score.home) {
        Ordering::Equal => format!("we're tied at {}", score.away),
        Ordering::Greater => match teams {
            Some(t) => format!("{} leads {} to {}", t.away, score.away, score.home),
            None => format!("the visitors lead {} to {}", score.away, score.home),
        },
        Ordering::Less => match teams {
            Some(t) => format!("{} leads {} to {}", t.home, score.home, score.away),
            None => format!("the home team leads {} to {}", score.home, score.away),
        },
    }
}

/// Summary spoken when a half-inning closes.
pub fn half_inning_summary(after: InningMarker, score: ScoreLine, teams: Option<&Teams>) -> String {
    format!(
        "After {}, {}.",
        half_inning_name(after),
        score_phrase(score, teams)
    )
}

/// Summary spoken once after the last narrated pitch.
pub fn closing_summary(score: ScoreLine, teams: Option<&Teams>) -> String {
    format!("That does it for our coverage, and {}.", score_phrase(score, teams))
}

/// Trim, capitalize and terminate a raw label as its own sentence.
pub fn sentence(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = capitalize_first(trimmed);
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
