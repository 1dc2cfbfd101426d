/// Sound library: effect clips loaded once from disk, read-only afterwards.
///
/// Layout under the root directory, per [`EffectKey`]:
/// - `<stem>.wav`: a single clip
/// - `<stem>/*.wav`: several variants, one picked at random per use
///
/// Missing pieces disable effects rather than failing.
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::audio::clip::AudioClip;
use crate::schema::effect::EffectKey;

#[derive(Debug, Clone, Default)]
pub struct SoundLibrary {
    clips: BTreeMap<EffectKey, Vec<AudioClip>>,
}

impl SoundLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every known key found under `dir`.
    ///
    /// A missing directory yields an empty library; unreadable or missing
    /// files only disable their own key. Each case is logged as a warning.
    pub fn load(dir: &Path) -> SoundLibrary {
        let mut library = SoundLibrary::new();
        if !dir.is_dir() {
            warn!(
                "sound directory {} not found; effects disabled",
                dir.display()
            );
            return library;
        }

        for key in EffectKey::ALL {
            let mut paths = Vec::new();
            let single = dir.join(format!("{}.wav", key.file_stem()));
            if single.is_file() {
                paths.push(single);
            }
            let variants = dir.join(key.file_stem());
            if variants.is_dir() {
                paths.extend(wav_files_in(&variants));
            }
            if paths.is_empty() {
                warn!("no clip for effect '{}' in {}", key, dir.display());
                continue;
            }

            for path in paths {
                match AudioClip::read_wav(&path) {
                    Ok(clip) => {
                        debug!("loaded {} for '{}'", path.display(), key);
                        library.insert(key, clip);
                    }
                    Err(e) => warn!("skipping {}: {}", path.display(), e),
                }
            }
        }

        info!(
            "sound library: {} of {} effects available",
            library.clips.len(),
            EffectKey::ALL.len()
        );
        library
    }

    /// Add a clip variant for `key`.
    pub fn insert(&mut self, key: EffectKey, clip: AudioClip) {
        self.clips.entry(key).or_default().push(clip);
    }

    pub fn contains(&self, key: EffectKey) -> bool {
        self.clips.contains_key(&key)
    }

    /// The first variant for `key`, if any.
    pub fn get(&self, key: EffectKey) -> Option<&AudioClip> {
        self.clips.get(&key).and_then(|v| v.first())
    }

    /// All variants for `key`.
    pub fn variants(&self, key: EffectKey) -> &[AudioClip] {
        self.clips.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A uniformly chosen variant for `key`.
    pub fn pick<R: Rng + ?Sized>(&self, key: EffectKey, rng: &mut R) -> Option<&AudioClip> {
        self.variants(key).choose(rng)
    }

    /// Keys with at least one clip.
    pub fn keys(&self) -> impl Iterator<Item = EffectKey> + '_ {
        self.clips.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

fn wav_files_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot read {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("wav"))
                    .unwrap_or(false)
        })
        .collect();
    paths.sort();
    paths
}
