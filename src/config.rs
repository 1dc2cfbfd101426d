/// Broadcast configuration: every tunable number in one RON-loadable struct.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::compositor::{CrowdTiming, MixSettings};
use crate::core::effects::EffectRules;
use crate::core::selector::SamplePolicy;
use crate::schema::effect::EffectKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Settings for one broadcast run. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Games longer than this are sampled unless key innings are given.
    pub max_events: usize,
    pub sample_head: usize,
    pub sample_middle: usize,
    pub sample_tail: usize,
    pub dedupe_samples: bool,
    /// Template and bat-pool seed; `None` draws from entropy.
    pub seed: Option<u64>,
    pub announce_count: bool,
    pub effect_gain_db: f32,
    pub ambient_gain_db: f32,
    pub ambient_enabled: bool,
    pub pre_effect_pause_ms: u64,
    pub post_effect_gap_ms: u64,
    pub crowd_timing: CrowdTiming,
    /// Keys drawn for ordinary bat contact.
    pub bat_pool: Vec<EffectKey>,
    /// Synthesis ceiling used when the provider reports none.
    pub max_chunk_chars: usize,
    pub words_per_minute: u32,
    pub sound_dir: Option<PathBuf>,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        let mix = MixSettings::default();
        let sample = SamplePolicy::default();
        Self {
            max_events: 50,
            sample_head: sample.head,
            sample_middle: sample.middle,
            sample_tail: sample.tail,
            dedupe_samples: sample.dedupe,
            seed: None,
            announce_count: false,
            effect_gain_db: mix.effect_gain_db,
            ambient_gain_db: mix.ambient_gain_db,
            ambient_enabled: mix.ambient_enabled,
            pre_effect_pause_ms: mix.pre_effect_pause_ms,
            post_effect_gap_ms: mix.post_effect_gap_ms,
            crowd_timing: mix.crowd_timing,
            bat_pool: EffectRules::default().bat_pool,
            max_chunk_chars: 4000,
            words_per_minute: 150,
            sound_dir: None,
        }
    }
}

impl BroadcastConfig {
    /// Load and validate a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<BroadcastConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a config from a RON string.
    pub fn parse_ron(input: &str) -> Result<BroadcastConfig, ConfigError> {
        let config: BroadcastConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.words_per_minute == 0 {
            return Err(ConfigError::Invalid("words_per_minute must be positive".to_string()));
        }
        if !self.ambient_gain_db.is_finite() || !self.effect_gain_db.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "gains must be finite, got effect {} dB and ambient {} dB",
                self.effect_gain_db, self.ambient_gain_db
            )));
        }
        if self.ambient_gain_db > 0.0 || self.effect_gain_db > 0.0 {
            return Err(ConfigError::Invalid(
                "effect and ambient gains must not boost above narration".to_string(),
            ));
        }
        if self.ambient_gain_db >= self.effect_gain_db {
            return Err(ConfigError::Invalid(format!(
                "ambient gain {} dB must be quieter than effect gain {} dB",
                self.ambient_gain_db, self.effect_gain_db
            )));
        }
        Ok(())
    }

    pub fn sample_policy(&self) -> SamplePolicy {
        SamplePolicy {
            head: self.sample_head,
            middle: self.sample_middle,
            tail: self.sample_tail,
            dedupe: self.dedupe_samples,
        }
    }

    pub fn effect_rules(&self) -> EffectRules {
        EffectRules {
            bat_pool: self.bat_pool.clone(),
        }
    }

    pub fn mix_settings(&self) -> MixSettings {
        MixSettings {
            effect_gain_db: self.effect_gain_db,
            ambient_gain_db: self.ambient_gain_db,
            ambient_enabled: self.ambient_enabled,
            pre_effect_pause_ms: self.pre_effect_pause_ms,
            post_effect_gap_ms: self.post_effect_gap_ms,
            crowd_timing: self.crowd_timing,
        }
    }
}
