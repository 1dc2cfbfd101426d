//! Speech synthesis seam.
//!
//! Text-to-speech is an external provider behind [`SpeechSynthesizer`]. The
//! crate only decides where to cut the text and how to join the results.

pub mod chunk;
pub mod timing;

use log::info;
use thiserror::Error;

use crate::audio::clip::{AudioClip, AudioError};
use chunk::split_for_synthesis;
use timing::ms_per_word;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis provider error: {0}")]
    Provider(String),
    #[error("nothing to synthesize")]
    EmptyText,
    #[error("chunk {index} of {total} failed: {source}")]
    Chunk {
        index: usize,
        total: usize,
        #[source]
        source: Box<SynthesisError>,
    },
    #[error("audio error: {0}")]
    Audio(#[from] AudioError),
}

/// A text-to-speech provider.
pub trait SpeechSynthesizer {
    /// Longest text, in characters, accepted by one [`synthesize`] call.
    /// Zero means unbounded.
    ///
    /// [`synthesize`]: SpeechSynthesizer::synthesize
    fn max_text_len(&self) -> usize;

    /// Speak `text`. Blocking; one request per call.
    fn synthesize(&mut self, text: &str) -> Result<AudioClip, SynthesisError>;
}

/// Synthesize narration text chunk by chunk and join the audio in order.
///
/// The first failing chunk aborts the whole call; retry policy is left to
/// the caller. Later chunks are converted to the first chunk's format.
pub fn synthesize_script<S: SpeechSynthesizer + ?Sized>(
    synth: &mut S,
    text: &str,
) -> Result<AudioClip, SynthesisError> {
    let max_len = synth.max_text_len();
    synthesize_chunked(synth, text, max_len)
}

/// [`synthesize_script`] with an explicit chunk ceiling.
pub fn synthesize_chunked<S: SpeechSynthesizer + ?Sized>(
    synth: &mut S,
    text: &str,
    max_len: usize,
) -> Result<AudioClip, SynthesisError> {
    let chunks = split_for_synthesis(text, max_len);
    let total = chunks.len();
    let mut joined: Option<AudioClip> = None;

    for (index, chunk) in chunks.iter().enumerate() {
        let clip = synth
            .synthesize(chunk)
            .map_err(|source| SynthesisError::Chunk {
                index,
                total,
                source: Box::new(source),
            })?;
        info!(
            "synthesized chunk {}/{} ({} chars, {} ms)",
            index + 1,
            total,
            chunk.chars().count(),
            clip.duration_ms()
        );
        match joined.as_mut() {
            Some(audio) => audio.append(&clip),
            None => joined = Some(clip),
        }
    }

    joined.ok_or(SynthesisError::EmptyText)
}

/// Offline stand-in provider: silence paced at a speaking rate.
///
/// Produces audio with realistic length so timelines can be previewed
/// without a speech service.
#[derive(Debug, Clone)]
pub struct PacedSilence {
    pub sample_rate: u32,
    pub channels: u16,
    pub words_per_minute: u32,
    pub max_text_len: usize,
}

impl Default for PacedSilence {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            channels: 1,
            words_per_minute: timing::DEFAULT_WORDS_PER_MINUTE,
            max_text_len: 4000,
        }
    }
}

impl SpeechSynthesizer for PacedSilence {
    fn max_text_len(&self) -> usize {
        self.max_text_len
    }

    fn synthesize(&mut self, text: &str) -> Result<AudioClip, SynthesisError> {
        let words = text.split_whitespace().count() as u64;
        Ok(AudioClip::silence(
            self.sample_rate,
            self.channels,
            words * ms_per_word(self.words_per_minute),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every request; fails on the configured call.
    struct Recorder {
        max: usize,
        calls: Vec<String>,
        fail_on: Option<usize>,
    }

    impl SpeechSynthesizer for Recorder {
        fn max_text_len(&self) -> usize {
            self.max
        }

        fn synthesize(&mut self, text: &str) -> Result<AudioClip, SynthesisError> {
            if self.fail_on == Some(self.calls.len()) {
                return Err(SynthesisError::Provider("quota exceeded".to_string()));
            }
            self.calls.push(text.to_string());
            Ok(AudioClip::silence(1000, 1, text.len() as u64))
        }
    }

    #[test]
    fn chunks_are_joined_in_order() {
        let mut synth = Recorder {
            max: 20,
            calls: Vec::new(),
            fail_on: None,
        };
        let audio = synthesize_script(&mut synth, "Top of the 1st.\n\nBottom of the 1st.").unwrap();
        assert_eq!(synth.calls, vec!["Top of the 1st.", "Bottom of the 1st."]);
        assert_eq!(audio.duration_ms(), 15 + 18);
    }

    #[test]
    fn failure_reports_chunk_index() {
        let mut synth = Recorder {
            max: 20,
            calls: Vec::new(),
            fail_on: Some(1),
        };
        let err = synthesize_script(&mut synth, "Top of the 1st.\n\nBottom of the 1st.").unwrap_err();
        match err {
            SynthesisError::Chunk { index, total, .. } => {
                assert_eq!(index, 1);
                assert_eq!(total, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn empty_text_is_an_error() {
        let mut synth = PacedSilence::default();
        assert!(matches!(
            synthesize_script(&mut synth, "  "),
            Err(SynthesisError::EmptyText)
        ));
    }

    #[test]
    fn paced_silence_follows_word_rate() {
        let mut synth = PacedSilence::default();
        let clip = synth.synthesize("one two three").unwrap();
        assert_eq!(clip.duration_ms(), 1200);
    }
}
