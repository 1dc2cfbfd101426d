/// Event selection: reduces a full game to the pitches worth narrating.
use log::{debug, warn};
use std::collections::BTreeSet;

use crate::schema::pitch::{HalfInning, PitchEvent};

/// How to reduce an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Every event, untouched.
    All,
    /// Events whose inning is in the set. An empty set selects everything.
    KeyInnings(BTreeSet<u32>),
    /// A single half-inning.
    HalfInning { inning: u32, half: HalfInning },
    /// First/middle/last windows once the game exceeds `max_events`.
    Sample { max_events: usize },
}

/// Window sizes and overlap policy for [`SelectionMode::Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePolicy {
    pub head: usize,
    pub middle: usize,
    pub tail: usize,
    /// Union overlapping windows by position instead of repeating events.
    pub dedupe: bool,
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self {
            head: 15,
            middle: 10,
            tail: 25,
            dedupe: true,
        }
    }
}

/// Select events with the default sampling policy.
pub fn select(events: &[PitchEvent], mode: &SelectionMode) -> Vec<PitchEvent> {
    select_with(events, mode, &SamplePolicy::default())
}

/// Select events. Original order is always preserved.
pub fn select_with(
    events: &[PitchEvent],
    mode: &SelectionMode,
    policy: &SamplePolicy,
) -> Vec<PitchEvent> {
    if events.is_empty() {
        warn!("no events to select from; broadcast will have no content");
        return Vec::new();
    }

    let selected: Vec<PitchEvent> = match mode {
        SelectionMode::All => events.to_vec(),
        SelectionMode::KeyInnings(innings) if innings.is_empty() => events.to_vec(),
        SelectionMode::KeyInnings(innings) => events
            .iter()
            .filter(|e| innings.contains(&e.inning))
            .cloned()
            .collect(),
        SelectionMode::HalfInning { inning, half } => events
            .iter()
            .filter(|e| e.inning == *inning && e.half == *half)
            .cloned()
            .collect(),
        SelectionMode::Sample { max_events } if events.len() <= *max_events => events.to_vec(),
        SelectionMode::Sample { .. } => sample_windows(events, policy)
            .into_iter()
            .map(|i| events[i].clone())
            .collect(),
    };

    debug!(
        "selected {} of {} events ({:?})",
        selected.len(),
        events.len(),
        mode
    );
    selected
}

/// Positions of the head, middle and tail windows.
fn sample_windows(events: &[PitchEvent], policy: &SamplePolicy) -> Vec<usize> {
    let len = events.len();
    let mid = len / 2;

    let head = 0..policy.head.min(len);
    let middle = mid..(mid + policy.middle).min(len);
    let tail = len.saturating_sub(policy.tail)..len;

    if policy.dedupe {
        let positions: BTreeSet<usize> = head.chain(middle).chain(tail).collect();
        positions.into_iter().collect()
    } else {
        head.chain(middle).chain(tail).collect()
    }
}

/// Innings in which either team's cumulative score went up.
///
/// Useful as the key-inning set for a "scoring plays only" broadcast.
pub fn scoring_innings(events: &[PitchEvent]) -> BTreeSet<u32> {
    let mut innings = BTreeSet::new();
    let mut previous = (0u32, 0u32);
    for event in events {
        if event.away_score > previous.0 || event.home_score > previous.1 {
            innings.insert(event.inning);
        }
        previous = (event.away_score, event.home_score);
    }
    innings
}
