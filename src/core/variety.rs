/// Variety pass: keeps consecutive calls from reusing the same phrasing.
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::core::grammar::{weighted_pick, GrammarError, GrammarRule};

/// Remembers the last alternative drawn for each rule.
///
/// When a rule has another usable alternative, the previous one is excluded
/// from the next draw, so the same sentence shape never repeats back to back.
#[derive(Debug, Clone, Default)]
pub struct VarietyPass {
    last_choice: FxHashMap<String, usize>,
}

impl VarietyPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick an alternative index for `rule` and record it.
    pub fn choose<R: Rng + ?Sized>(
        &mut self,
        rule: &GrammarRule,
        rng: &mut R,
    ) -> Result<usize, GrammarError> {
        let last = self.last_choice.get(&rule.name).copied();
        let skip = last.filter(|&previous| {
            rule.alternatives
                .iter()
                .enumerate()
                .any(|(i, alt)| i != previous && alt.weight > 0)
        });
        let index = weighted_pick(rule, skip, rng)?;
        self.last_choice.insert(rule.name.clone(), index);
        Ok(index)
    }

    /// Forget all history, e.g. between broadcasts.
    pub fn reset(&mut self) {
        self.last_choice.clear();
    }
}
