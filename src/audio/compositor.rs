/// Audio timeline compositor: narration slices, effect clips and pauses laid
/// end to end, with an optional looped ambient bed mixed underneath.
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::audio::clip::{ms_to_frames, AudioClip};
use crate::audio::library::SoundLibrary;
use crate::schema::effect::EffectKey;

/// How the contact sound and the crowd reaction share time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrowdTiming {
    /// Crowd starts when the contact sound ends.
    #[default]
    Sequential,
    /// Both start together; the block lasts as long as the longer clip.
    Simultaneous,
}

/// Effects to insert at a point in the narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCue {
    /// Position in the narration audio, milliseconds from its start.
    pub offset_ms: u64,
    pub effects: Vec<EffectKey>,
}

/// Levels and pauses used while composing.
#[derive(Debug, Clone, PartialEq)]
pub struct MixSettings {
    pub effect_gain_db: f32,
    pub ambient_gain_db: f32,
    pub ambient_enabled: bool,
    pub pre_effect_pause_ms: u64,
    pub post_effect_gap_ms: u64,
    pub crowd_timing: CrowdTiming,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            effect_gain_db: -3.0,
            ambient_gain_db: -15.0,
            ambient_enabled: false,
            pre_effect_pause_ms: 800,
            post_effect_gap_ms: 300,
            crowd_timing: CrowdTiming::Sequential,
        }
    }
}

/// Where a span of the output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSource {
    /// Narration frames `[from, to)`.
    Narration { from: usize, to: usize },
    Effect(EffectKey),
    Silence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start_frame: usize,
    pub frames: usize,
    pub source: SegmentSource,
}

impl Segment {
    pub fn end_frame(&self) -> usize {
        self.start_frame + self.frames
    }
}

/// Ordered segments of one composed broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeTimeline {
    pub sample_rate: u32,
    pub channels: u16,
    pub segments: Vec<Segment>,
    /// True when an ambient bed was mixed under the whole track.
    pub ambient: bool,
}

impl CompositeTimeline {
    pub fn total_frames(&self) -> usize {
        self.segments
            .iter()
            .map(Segment::end_frame)
            .max()
            .unwrap_or(0)
    }

    /// Frames contributed by sources other than narration.
    pub fn inserted_frames(&self) -> usize {
        let narration: usize = self
            .segments
            .iter()
            .filter(|s| matches!(s.source, SegmentSource::Narration { .. }))
            .map(|s| s.frames)
            .sum();
        self.total_frames() - narration
    }

    pub fn effects(&self) -> impl Iterator<Item = (usize, EffectKey)> + '_ {
        self.segments.iter().filter_map(|s| match s.source {
            SegmentSource::Effect(key) => Some((s.start_frame, key)),
            _ => None,
        })
    }
}

/// A finished mix and the timeline that produced it.
#[derive(Debug, Clone)]
pub struct Composition {
    pub timeline: CompositeTimeline,
    pub audio: AudioClip,
}

/// Mixes narration with library effects. Borrows the library read-only, so
/// one library can serve any number of broadcasts.
pub struct Compositor<'a> {
    library: &'a SoundLibrary,
    settings: MixSettings,
}

impl<'a> Compositor<'a> {
    pub fn new(library: &'a SoundLibrary, settings: MixSettings) -> Self {
        Self { library, settings }
    }

    pub fn settings(&self) -> &MixSettings {
        &self.settings
    }

    /// Build the broadcast.
    ///
    /// Cues are taken in offset order (ties keep input order). Each cue
    /// appends the narration up to its offset, the pre-effect pause, its
    /// effects and the post-effect gap; the narration tail follows the last
    /// cue. A key with no clip adds nothing and leaves the pauses in place.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        narration: &AudioClip,
        cues: &[EffectCue],
        rng: &mut R,
    ) -> Composition {
        let rate = narration.sample_rate;
        let channels = narration.channels;
        let mut out = Builder::new(rate, channels);

        let mut ordered: Vec<&EffectCue> = cues.iter().collect();
        ordered.sort_by_key(|cue| cue.offset_ms);

        let total = narration.frames();
        let mut cursor = 0usize;
        for cue in ordered {
            let at = ms_to_frames(cue.offset_ms, rate).clamp(cursor, total);
            out.narration(narration, cursor, at);
            cursor = at;

            out.silence(ms_to_frames(self.settings.pre_effect_pause_ms, rate));
            self.insert_effects(&mut out, &cue.effects, rng);
            out.silence(ms_to_frames(self.settings.post_effect_gap_ms, rate));
        }
        out.narration(narration, cursor, total);

        let Builder {
            mut audio,
            segments,
        } = out;
        let ambient = self.settings.ambient_enabled && self.lay_ambient(&mut audio, rng);

        let timeline = CompositeTimeline {
            sample_rate: rate,
            channels,
            segments,
            ambient,
        };
        info!(
            "composed {} ms from {} ms narration and {} cues",
            audio.duration_ms(),
            narration.duration_ms(),
            cues.len()
        );
        Composition { timeline, audio }
    }

    fn insert_effects<R: Rng + ?Sized>(&self, out: &mut Builder, keys: &[EffectKey], rng: &mut R) {
        let mut ordered: Vec<EffectKey> = keys
            .iter()
            .copied()
            .filter(|k| *k != EffectKey::Ambient)
            .collect();
        ordered.sort_by_key(|k| !k.is_contact());

        let clips: Vec<(EffectKey, AudioClip)> = ordered
            .into_iter()
            .filter_map(|key| match self.library.pick(key, rng) {
                Some(clip) => Some((
                    key,
                    clip.to_format(out.audio.sample_rate, out.audio.channels)
                        .with_gain_db(self.settings.effect_gain_db),
                )),
                None => {
                    debug!("no clip for '{}'", key);
                    None
                }
            })
            .collect();

        match self.settings.crowd_timing {
            CrowdTiming::Sequential => {
                for (key, clip) in &clips {
                    out.effect(*key, clip);
                }
            }
            CrowdTiming::Simultaneous => out.stacked_effects(&clips),
        }
    }

    /// Tile the ambient clip over the whole track. False when there is none.
    fn lay_ambient<R: Rng + ?Sized>(&self, audio: &mut AudioClip, rng: &mut R) -> bool {
        let Some(bed) = self.library.pick(EffectKey::Ambient, rng) else {
            warn!("ambient overlay requested but no ambient clip is loaded");
            return false;
        };
        let bed = bed
            .to_format(audio.sample_rate, audio.channels)
            .tile_to(audio.frames())
            .with_gain_db(self.settings.ambient_gain_db);
        audio.overlay(&bed, 0);
        true
    }
}

/// Output clip plus the segment log, grown together.
struct Builder {
    audio: AudioClip,
    segments: Vec<Segment>,
}

impl Builder {
    fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            audio: AudioClip::empty(sample_rate, channels),
            segments: Vec::new(),
        }
    }

    fn push(&mut self, frames: usize, source: SegmentSource) {
        if frames > 0 {
            self.segments.push(Segment {
                start_frame: self.audio.frames(),
                frames,
                source,
            });
        }
    }

    fn narration(&mut self, narration: &AudioClip, from: usize, to: usize) {
        let slice = narration.slice_frames(from, to);
        self.push(slice.frames(), SegmentSource::Narration { from, to });
        self.audio.append(&slice);
    }

    fn silence(&mut self, frames: usize) {
        self.push(frames, SegmentSource::Silence);
        let zeros = frames * self.audio.channels as usize;
        self.audio.samples.resize(self.audio.samples.len() + zeros, 0.0);
    }

    fn effect(&mut self, key: EffectKey, clip: &AudioClip) {
        self.push(clip.frames(), SegmentSource::Effect(key));
        self.audio.append(clip);
    }

    /// All clips start at the current frame; the block is as long as the
    /// longest one.
    fn stacked_effects(&mut self, clips: &[(EffectKey, AudioClip)]) {
        let start = self.audio.frames();
        let longest = clips.iter().map(|(_, c)| c.frames()).max().unwrap_or(0);
        for (key, clip) in clips {
            if clip.frames() > 0 {
                self.segments.push(Segment {
                    start_frame: start,
                    frames: clip.frames(),
                    source: SegmentSource::Effect(*key),
                });
            }
        }
        let zeros = longest * self.audio.channels as usize;
        self.audio.samples.resize(self.audio.samples.len() + zeros, 0.0);
        for (_, clip) in clips {
            self.audio.overlay(clip, start);
        }
    }
}
