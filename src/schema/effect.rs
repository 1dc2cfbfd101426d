use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier selecting a clip from the sound library.
///
/// Each key maps to a file stem (or subdirectory name) under the sound
/// library root, e.g. `catch_fast.wav` or `bat_random/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKey {
    /// Glove pop for a hard pitch.
    CatchFast,
    /// Softer glove sound for off-speed pitches.
    CatchSlow,
    /// The signature crack, reserved for home runs and part of the generic pool.
    BatPrimary,
    /// Generic bat-on-ball contact.
    BatRandom,
    BatBunt,
    CrowdReaction,
    /// Looping background crowd, only used by the ambient overlay.
    Ambient,
}

impl EffectKey {
    /// Every key, in library load order.
    pub const ALL: [EffectKey; 7] = [
        EffectKey::CatchFast,
        EffectKey::CatchSlow,
        EffectKey::BatPrimary,
        EffectKey::BatRandom,
        EffectKey::BatBunt,
        EffectKey::CrowdReaction,
        EffectKey::Ambient,
    ];

    /// File stem / directory name on disk.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::CatchFast => "catch_fast",
            Self::CatchSlow => "catch_slow",
            Self::BatPrimary => "bat_primary",
            Self::BatRandom => "bat_random",
            Self::BatBunt => "bat_bunt",
            Self::CrowdReaction => "crowd_reaction",
            Self::Ambient => "ambient",
        }
    }

    /// Inverse of [`EffectKey::file_stem`].
    pub fn from_file_stem(stem: &str) -> Option<EffectKey> {
        Self::ALL.iter().copied().find(|key| key.file_stem() == stem)
    }

    /// True for the catch/contact sounds that fire first for a pitch.
    pub fn is_contact(&self) -> bool {
        !matches!(self, Self::CrowdReaction | Self::Ambient)
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}
