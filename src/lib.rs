//! Pitchcast: pitch-by-pitch baseball narration with sound-effect mixing.
//!
//! Turns an ordered list of recorded pitches into a broadcast script, hands
//! the text to a speech provider, and lays glove pops, bat cracks and crowd
//! reactions onto the narration along a single audio timeline.

pub mod audio;
pub mod config;
pub mod core;
pub mod schema;
pub mod source;
pub mod synth;

pub use crate::audio::compositor::{Composition, CrowdTiming, EffectCue};
pub use crate::config::BroadcastConfig;
pub use crate::core::narrator::{GameResult, Narrator};
pub use crate::core::pipeline::{BroadcastOutcome, BroadcastPipeline, PipelineError};
pub use crate::core::selector::SelectionMode;
pub use crate::schema::pitch::{HalfInning, PitchEvent};
pub use crate::schema::utterance::{Script, Teams, Utterance};
