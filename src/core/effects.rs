/// Sound effect rules: which library clips a pitch triggers.
///
/// Selection is a pure function of the event plus the injected random
/// source used for the generic bat pool.
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::phrasing::{AtBatOutcome, PitchOutcome};
use crate::schema::effect::EffectKey;
use crate::schema::pitch::PitchEvent;

/// Sinkers above this speed (mph) get the fast glove pop.
pub const SINKER_FAST_ABOVE: f64 = 93.0;
/// Cutters above this speed get the fast glove pop.
pub const CUTTER_FAST_ABOVE: f64 = 94.0;
/// Any pitch above this speed gets the fast glove pop.
pub const ANY_FAST_ABOVE: f64 = 95.0;

/// Tunable parts of effect selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectRules {
    /// Keys drawn uniformly for ordinary contact.
    pub bat_pool: Vec<EffectKey>,
}

impl Default for EffectRules {
    fn default() -> Self {
        Self {
            bat_pool: vec![EffectKey::BatPrimary, EffectKey::BatRandom],
        }
    }
}

impl EffectRules {
    /// Effects for one pitch, contact sound first, then crowd reaction.
    pub fn select<R: Rng + ?Sized>(&self, event: &PitchEvent, rng: &mut R) -> Vec<EffectKey> {
        let at_bat = event
            .at_bat_event
            .as_deref()
            .filter(|label| !label.trim().is_empty());

        let mut keys = Vec::with_capacity(2);
        if PitchOutcome::classify(&event.result) == PitchOutcome::InPlay {
            keys.push(self.bat_effect(event, at_bat, rng));
            if at_bat.map(crowd_worthy).unwrap_or(false) {
                keys.push(EffectKey::CrowdReaction);
            }
        } else {
            keys.push(catch_effect(&event.pitch_type, event.speed));
        }

        debug!(
            "effects for {} {:.1} '{}': {:?}",
            event.pitch_type, event.speed, event.result, keys
        );
        keys
    }

    fn bat_effect<R: Rng + ?Sized>(
        &self,
        event: &PitchEvent,
        at_bat: Option<&str>,
        rng: &mut R,
    ) -> EffectKey {
        let outcome = at_bat.map(AtBatOutcome::classify);
        if outcome == Some(AtBatOutcome::HomeRun) {
            return EffectKey::BatPrimary;
        }
        let bunt = event.result.to_lowercase().contains("bunt")
            || at_bat.map(|l| l.to_lowercase().contains("bunt")).unwrap_or(false);
        if bunt {
            return EffectKey::BatBunt;
        }
        self.bat_pool
            .choose(rng)
            .copied()
            .unwrap_or(EffectKey::BatRandom)
    }
}

/// [`EffectRules::select`] with the default bat pool.
pub fn select_effects<R: Rng + ?Sized>(event: &PitchEvent, rng: &mut R) -> Vec<EffectKey> {
    EffectRules::default().select(event, rng)
}

/// Glove sound for a pitch that was not put in play.
pub fn catch_effect(pitch_type: &str, speed: f64) -> EffectKey {
    let category = pitch_type.to_lowercase();
    let fast = (category.contains("fastball") && !category.contains("seam"))
        || (category.contains("sinker") && speed > SINKER_FAST_ABOVE)
        || (category.contains("cutter") && speed > CUTTER_FAST_ABOVE)
        || speed > ANY_FAST_ABOVE;
    if fast {
        EffectKey::CatchFast
    } else {
        EffectKey::CatchSlow
    }
}

/// Outcomes that bring the crowd up: hits of any kind.
fn crowd_worthy(label: &str) -> bool {
    AtBatOutcome::classify(label).is_base_hit() || label.to_lowercase().contains("hit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::pitch::HalfInning;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn event(pitch_type: &str, speed: f64, result: &str, at_bat: Option<&str>) -> PitchEvent {
        let mut e = PitchEvent::new(1, HalfInning::Top, "A", "B");
        e.pitch_type = pitch_type.to_string();
        e.speed = speed;
        e.result = result.to_string();
        e.at_bat_event = at_bat.map(str::to_string);
        e
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn speed_overrides_category() {
        let e = event("Curveball", 96.0, "Called Strike", None);
        assert_eq!(select_effects(&e, &mut rng()), vec![EffectKey::CatchFast]);
    }

    #[test]
    fn sinker_threshold() {
        let fast = event("Sinker", 94.0, "Ball", None);
        let slow = event("Sinker", 90.0, "Ball", None);
        assert_eq!(select_effects(&fast, &mut rng()), vec![EffectKey::CatchFast]);
        assert_eq!(select_effects(&slow, &mut rng()), vec![EffectKey::CatchSlow]);
    }

    #[test]
    fn cutter_threshold_is_exclusive() {
        assert_eq!(catch_effect("Cutter", 94.0), EffectKey::CatchSlow);
        assert_eq!(catch_effect("Cutter", 94.1), EffectKey::CatchFast);
    }

    #[test]
    fn seam_fastballs_rely_on_speed() {
        assert_eq!(catch_effect("Fastball", 88.0), EffectKey::CatchFast);
        assert_eq!(catch_effect("Four-Seam Fastball", 92.0), EffectKey::CatchSlow);
        assert_eq!(catch_effect("Four-Seam Fastball", 97.0), EffectKey::CatchFast);
        assert_eq!(catch_effect("Changeup", 0.0), EffectKey::CatchSlow);
    }

    #[test]
    fn home_run_gets_primary_bat_and_crowd() {
        let e = event("Slider", 86.0, "In play, run(s)", Some("Home Run"));
        assert_eq!(
            select_effects(&e, &mut rng()),
            vec![EffectKey::BatPrimary, EffectKey::CrowdReaction]
        );
    }

    #[test]
    fn bunt_gets_bunt_sound_without_crowd() {
        let e = event("Fastball", 93.0, "In play, out(s)", Some("Sac Bunt"));
        assert_eq!(select_effects(&e, &mut rng()), vec![EffectKey::BatBunt]);
    }

    #[test]
    fn generic_contact_draws_from_pool() {
        let e = event("Slider", 86.0, "In play, out(s)", Some("Groundout"));
        let mut rng = rng();
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..50 {
            let keys = select_effects(&e, &mut rng);
            assert_eq!(keys.len(), 1);
            seen.insert(keys[0]);
        }
        assert_eq!(
            seen.into_iter().collect::<Vec<_>>(),
            vec![EffectKey::BatPrimary, EffectKey::BatRandom]
        );
    }

    #[test]
    fn single_brings_crowd() {
        let e = event("Changeup", 84.0, "In play, no out", Some("Single"));
        let keys = select_effects(&e, &mut rng());
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1], EffectKey::CrowdReaction);
    }

    #[test]
    fn triple_play_keeps_crowd_quiet() {
        let e = event("Slider", 85.0, "In play, out(s)", Some("Triple Play"));
        let keys = select_effects(&e, &mut rng());
        assert_eq!(keys.len(), 1);
        assert!(keys[0].is_contact());
    }

    #[test]
    fn strikeout_pitch_is_a_catch() {
        let e = event("Slider", 85.0, "Swinging Strike", Some("Strikeout"));
        assert_eq!(select_effects(&e, &mut rng()), vec![EffectKey::CatchSlow]);
    }

    #[test]
    fn custom_pool() {
        let rules = EffectRules {
            bat_pool: vec![EffectKey::BatRandom],
        };
        let e = event("Slider", 86.0, "In play, out(s)", None);
        assert_eq!(rules.select(&e, &mut rng()), vec![EffectKey::BatRandom]);

        let empty = EffectRules { bat_pool: Vec::new() };
        assert_eq!(empty.select(&e, &mut rng()), vec![EffectKey::BatRandom]);
    }
}
