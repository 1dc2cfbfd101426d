/// In-memory PCM audio: interleaved `f32` samples in [-1, 1].
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported WAV format: {format:?} at {bits} bits")]
    UnsupportedFormat { format: SampleFormat, bits: u16 },
    #[error("invalid audio format: {0}")]
    InvalidFormat(String),
}

/// A decoded clip. Frames are `channels` consecutive samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl AudioClip {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Result<Self, AudioError> {
        if sample_rate == 0 || channels == 0 {
            return Err(AudioError::InvalidFormat(format!(
                "{} Hz, {} channels",
                sample_rate, channels
            )));
        }
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::InvalidFormat(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            samples,
        })
    }

    /// An empty clip in the given format.
    pub fn empty(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            samples: Vec::new(),
        }
    }

    /// `ms` milliseconds of silence.
    pub fn silence(sample_rate: u32, channels: u16, ms: u64) -> Self {
        let frames = ms_to_frames(ms, sample_rate);
        Self {
            sample_rate,
            channels,
            samples: vec![0.0; frames * channels as usize],
        }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_ms(&self) -> u64 {
        frames_to_ms(self.frames(), self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True when `other` can be mixed or appended sample for sample.
    pub fn same_format(&self, other: &AudioClip) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    /// Frames `[from, to)`, clamped to the clip.
    pub fn slice_frames(&self, from: usize, to: usize) -> AudioClip {
        let ch = self.channels as usize;
        let end = to.min(self.frames());
        let start = from.min(end);
        AudioClip {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples: self.samples[start * ch..end * ch].to_vec(),
        }
    }

    /// Milliseconds `[from_ms, to_ms)`, clamped to the clip.
    pub fn slice_ms(&self, from_ms: u64, to_ms: u64) -> AudioClip {
        self.slice_frames(
            ms_to_frames(from_ms, self.sample_rate),
            ms_to_frames(to_ms, self.sample_rate),
        )
    }

    /// Append `other`, converting it to this clip's format first.
    pub fn append(&mut self, other: &AudioClip) {
        if self.same_format(other) {
            self.samples.extend_from_slice(&other.samples);
        } else {
            let converted = other.to_format(self.sample_rate, self.channels);
            self.samples.extend_from_slice(&converted.samples);
        }
    }

    /// Copy with every sample scaled by `db` decibels.
    pub fn with_gain_db(&self, db: f32) -> AudioClip {
        let factor = db_to_amplitude(db);
        AudioClip {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples: self.samples.iter().map(|s| s * factor).collect(),
        }
    }

    /// Mix `other` into this clip starting at `at_frame`.
    ///
    /// Never changes this clip's length: anything past the end is dropped.
    pub fn overlay(&mut self, other: &AudioClip, at_frame: usize) {
        let converted;
        let other = if self.same_format(other) {
            other
        } else {
            converted = other.to_format(self.sample_rate, self.channels);
            &converted
        };
        let start = at_frame * self.channels as usize;
        if start >= self.samples.len() {
            return;
        }
        for (dst, src) in self.samples[start..].iter_mut().zip(&other.samples) {
            *dst = (*dst + src).clamp(-1.0, 1.0);
        }
    }

    /// Repeat this clip end to end and cut it to exactly `frames` frames.
    pub fn tile_to(&self, frames: usize) -> AudioClip {
        let ch = self.channels as usize;
        let samples = if self.samples.is_empty() {
            vec![0.0; frames * ch]
        } else {
            self.samples
                .iter()
                .copied()
                .cycle()
                .take(frames * ch)
                .collect()
        };
        AudioClip {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples,
        }
    }

    /// Convert channel layout, then sample rate by linear interpolation.
    pub fn to_format(&self, sample_rate: u32, channels: u16) -> AudioClip {
        let remixed = remix_channels(&self.samples, self.channels, channels);
        let samples = if self.sample_rate == sample_rate {
            remixed
        } else {
            resample_linear(&remixed, channels, self.sample_rate, sample_rate)
        };
        AudioClip {
            sample_rate,
            channels,
            samples,
        }
    }

    /// Decode a WAV file of 8/16/24/32-bit integer or 32-bit float samples.
    pub fn read_wav(path: &Path) -> Result<AudioClip, AudioError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
            (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
                let scale = (1u64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
            (format, bits) => return Err(AudioError::UnsupportedFormat { format, bits }),
        };

        AudioClip::new(spec.sample_rate, spec.channels, samples)
    }

    /// Encode as 16-bit PCM WAV.
    pub fn write_wav(&self, path: &Path) -> Result<(), AudioError> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        info!(
            "wrote {} ({} ms, {} Hz, {} ch)",
            path.display(),
            self.duration_ms(),
            self.sample_rate,
            self.channels
        );
        Ok(())
    }
}

pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

pub fn ms_to_frames(ms: u64, sample_rate: u32) -> usize {
    ((ms as u128 * sample_rate as u128 + 500) / 1000) as usize
}

pub fn frames_to_ms(frames: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    ((frames as u128 * 1000 + sample_rate as u128 / 2) / sample_rate as u128) as u64
}

/// Mono is spread to every output channel; otherwise channels are averaged
/// down to mono first.
fn remix_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to {
        return samples.to_vec();
    }
    let from = from.max(1) as usize;
    let to = to.max(1) as usize;
    samples
        .chunks_exact(from)
        .flat_map(|frame| {
            let mono = frame.iter().sum::<f32>() / from as f32;
            std::iter::repeat(mono).take(to)
        })
        .collect()
}

/// Linear interpolation between neighbouring frames.
fn resample_linear(samples: &[f32], channels: u16, from_rate: u32, to_rate: u32) -> Vec<f32> {
    let ch = channels.max(1) as usize;
    let in_frames = samples.len() / ch;
    if in_frames == 0 || from_rate == 0 {
        return Vec::new();
    }
    let out_frames = ((in_frames as u128 * to_rate as u128) / from_rate as u128) as usize;
    let step = from_rate as f64 / to_rate as f64;

    let mut out = Vec::with_capacity(out_frames * ch);
    for i in 0..out_frames {
        let pos = i as f64 * step;
        let i0 = (pos.floor() as usize).min(in_frames - 1);
        let i1 = (i0 + 1).min(in_frames - 1);
        let frac = (pos - i0 as f64) as f32;
        for c in 0..ch {
            let s0 = samples[i0 * ch + c];
            let s1 = samples[i1 * ch + c];
            out.push(s0 + (s1 - s0) * frac);
        }
    }
    out
}
