use serde::{Deserialize, Serialize};

use super::pitch::{InningMarker, ScoreLine};

/// Team display names used in score summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    pub away: String,
    pub home: String,
}

impl Teams {
    pub fn new(away: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            away: away.into(),
            home: home.into(),
        }
    }
}

/// What an utterance does in the broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtteranceKind {
    InningAnnouncement,
    Pitch,
    ScoreSummary,
    Recap,
}

/// Score snapshot attached to a summary utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// The half-inning the summary closes.
    pub after: InningMarker,
    pub score: ScoreLine,
    /// True for the closing summary after the last event.
    pub is_final: bool,
}

/// One line of narration plus the metadata needed downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub kind: UtteranceKind,
    pub inning_marker: Option<InningMarker>,
    pub score_summary: Option<ScoreSummary>,
    /// Index into the selected event list for pitch utterances.
    pub event_index: Option<usize>,
}

impl Utterance {
    pub fn announcement(text: String, marker: InningMarker) -> Self {
        Self {
            text,
            kind: UtteranceKind::InningAnnouncement,
            inning_marker: Some(marker),
            score_summary: None,
            event_index: None,
        }
    }

    pub fn pitch(text: String, event_index: usize) -> Self {
        Self {
            text,
            kind: UtteranceKind::Pitch,
            inning_marker: None,
            score_summary: None,
            event_index: Some(event_index),
        }
    }

    pub fn summary(text: String, summary: ScoreSummary) -> Self {
        Self {
            text,
            kind: UtteranceKind::ScoreSummary,
            inning_marker: None,
            score_summary: Some(summary),
            event_index: None,
        }
    }

    pub fn recap(text: String) -> Self {
        Self {
            text,
            kind: UtteranceKind::Recap,
            inning_marker: None,
            score_summary: None,
            event_index: None,
        }
    }
}

/// The ordered narration for one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub utterances: Vec<Utterance>,
}

impl Script {
    pub fn new(utterances: Vec<Utterance>) -> Self {
        Self { utterances }
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    /// Narration text for the synthesis provider.
    ///
    /// Sentences are joined by a single space; every inning announcement
    /// and the recap open a new paragraph (blank line), which is where
    /// chunked synthesis prefers to split.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for utterance in &self.utterances {
            if text.is_empty() {
                text.push_str(&utterance.text);
                continue;
            }
            match utterance.kind {
                UtteranceKind::InningAnnouncement | UtteranceKind::Recap => text.push_str("\n\n"),
                _ => text.push(' '),
            }
            text.push_str(&utterance.text);
        }
        text
    }

    /// Number of spoken words, used for cue timing estimates.
    pub fn word_count(&self) -> usize {
        self.utterances
            .iter()
            .map(|u| u.text.split_whitespace().count())
            .sum()
    }
}
