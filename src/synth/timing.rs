/// Word-rate timing: where in the narration audio each pitch call ends.
///
/// Providers return one opaque buffer, so cue positions are estimated from
/// word counts and then stretched to the real narration length.
use crate::schema::utterance::{Script, UtteranceKind};

/// Typical broadcast speaking rate.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 150;

/// Estimated end of one pitch utterance in the narration audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchMark {
    /// Index into the selected events.
    pub event_index: usize,
    pub offset_ms: u64,
}

/// Milliseconds per spoken word at `words_per_minute` (0 falls back to the default).
pub fn ms_per_word(words_per_minute: u32) -> u64 {
    let wpm = if words_per_minute == 0 {
        DEFAULT_WORDS_PER_MINUTE
    } else {
        words_per_minute
    };
    60_000 / wpm as u64
}

/// Expected narration length for `script` at the given speaking rate.
pub fn estimate_duration_ms(script: &Script, words_per_minute: u32) -> u64 {
    script.word_count() as u64 * ms_per_word(words_per_minute)
}

/// One mark per pitch utterance, placed after its last word.
///
/// With a known `narration_ms` the word positions are scaled to it;
/// with `narration_ms == 0` the raw word-rate estimate is used.
pub fn estimate_cues(script: &Script, narration_ms: u64, words_per_minute: u32) -> Vec<PitchMark> {
    let total_words = script.word_count() as u64;
    if total_words == 0 {
        return Vec::new();
    }
    let per_word = ms_per_word(words_per_minute);

    let mut words_so_far = 0u64;
    let mut marks = Vec::new();
    for utterance in &script.utterances {
        words_so_far += utterance.text.split_whitespace().count() as u64;
        if utterance.kind != UtteranceKind::Pitch {
            continue;
        }
        let Some(event_index) = utterance.event_index else {
            continue;
        };
        let offset_ms = if narration_ms > 0 {
            words_so_far * narration_ms / total_words
        } else {
            words_so_far * per_word
        };
        marks.push(PitchMark {
            event_index,
            offset_ms,
        });
    }
    marks
}
