//! Trauma capacity — aggregate of independently enabled sub-pools.
//!
//! Each sheet section that can absorb harm (stress tracks, consequences,
//! age wounds, ladders, population) is turned into a [`PoolContribution`]
//! by one of the pool builders below. [`aggregate_capacity`] sums the
//! enabled ones. The remaining value is `capacity - used` and is never
//! clamped: a negative value means the target is overwhelmed.
//!
//! ```
//! use farstar_logic::capacity::{aggregate_capacity, growing_pool};
//! use farstar_logic::track::{StressBox, Track};
//!
//! let mut stress = Track::filled(3, StressBox::default);
//! stress.boxes[0].checked = true;
//! stress.boxes[2].checked = true;
//! let pool = aggregate_capacity(&[growing_pool(&stress, true)]);
//! assert_eq!((pool.capacity, pool.used), (6, 4));
//! assert_eq!(pool.value(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::age::AgeTrack;
use crate::constants::consequences;
use crate::track::{indexed_value, CheckBox, Rung, TriStateBox, Track};

/// One sub-pool's share of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolContribution {
    pub enabled: bool,
    pub capacity: i32,
    pub used: i32,
}

impl PoolContribution {
    pub fn new(capacity: i32, used: i32) -> Self {
        Self {
            enabled: true,
            capacity,
            used,
        }
    }

    pub fn enabled_if(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }
}

/// Summed capacity and usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPool {
    pub capacity: i32,
    pub used: i32,
}

impl CapacityPool {
    /// Remaining capacity. May be negative.
    pub fn value(&self) -> i32 {
        self.capacity - self.used
    }

    pub fn is_overwhelmed(&self) -> bool {
        self.value() < 0
    }
}

/// Sum every enabled contribution. Disabled ones add nothing.
pub fn aggregate_capacity(pools: &[PoolContribution]) -> CapacityPool {
    pools
        .iter()
        .filter(|p| p.enabled)
        .fold(CapacityPool::default(), |acc, p| CapacityPool {
            capacity: acc.capacity + p.capacity,
            used: acc.used + p.used,
        })
}

/// Every active box is worth `per_box_value`. A value of 0 keeps the track
/// on the sheet but out of the total.
pub fn fixed_box_pool<B: CheckBox>(
    track: &Track<B>,
    per_box_value: i32,
    enabled: bool,
) -> PoolContribution {
    PoolContribution::new(
        per_box_value * track.len() as i32,
        per_box_value * track.checked_count() as i32,
    )
    .enabled_if(enabled)
}

/// Box `i` is worth `i + 1`.
pub fn growing_pool<B: CheckBox>(track: &Track<B>, enabled: bool) -> PoolContribution {
    let capacity = (0..track.len()).map(indexed_value).sum();
    PoolContribution::new(capacity, track.checked_indexed_sum()).enabled_if(enabled)
}

/// Rungs in the active window, each worth `per_rung_value`.
pub fn ladder_pool(ladder: &Track<Rung>, per_rung_value: i32, enabled: bool) -> PoolContribution {
    fixed_box_pool(ladder, per_rung_value, enabled)
}

/// Escalating tri-state track. Only expended boxes count as used.
pub fn population_pool(track: &Track<TriStateBox>, enabled: bool) -> PoolContribution {
    growing_pool(track, enabled)
}

/// One point per stage not yet passed or scarred; used when wounded.
pub fn age_wound_pool(age_track: &AgeTrack, enabled: bool) -> PoolContribution {
    let open = age_track.stages.iter().filter(|s| s.is_open());
    let (capacity, used) = open.fold((0, 0), |(capacity, used), stage| {
        (capacity + 1, used + i32::from(stage.wound))
    });
    PoolContribution::new(capacity, used).enabled_if(enabled)
}

/// Visible slots add their value; filled slots count as used even when
/// treated.
pub fn consequence_pool(slots: &Consequences, enabled: bool) -> PoolContribution {
    let (capacity, used) = slots
        .slots()
        .into_iter()
        .filter(|(_, slot)| slot.visible)
        .fold((0, 0), |(capacity, used), (value, slot)| {
            let filled = if slot.is_filled() { value } else { 0 };
            (capacity + value, used + filled)
        });
    PoolContribution::new(capacity, used).enabled_if(enabled)
}

/// A consequence slot on a sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsequenceSlot {
    pub visible: bool,
    /// Consequence text; blank means the slot is empty.
    pub value: String,
    pub treated: bool,
    pub free_invoke: bool,
}

impl ConsequenceSlot {
    pub fn shown() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }

    /// A filled, untreated slot whose free invoke has not been spent.
    pub fn free_invoke_available(&self) -> bool {
        self.is_filled() && !self.free_invoke && !self.treated
    }
}

/// The four consequence slots. The second minor slot is hidden unless a
/// sheet opts into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consequences {
    pub minor: ConsequenceSlot,
    pub minor2: ConsequenceSlot,
    pub moderate: ConsequenceSlot,
    pub severe: ConsequenceSlot,
}

impl Default for Consequences {
    fn default() -> Self {
        Self {
            minor: ConsequenceSlot::shown(),
            minor2: ConsequenceSlot::default(),
            moderate: ConsequenceSlot::shown(),
            severe: ConsequenceSlot::shown(),
        }
    }
}

impl Consequences {
    /// Each slot paired with its trauma value, mildest first.
    pub fn slots(&self) -> [(i32, &ConsequenceSlot); 4] {
        [
            (consequences::MINOR, &self.minor),
            (consequences::MINOR2, &self.minor2),
            (consequences::MODERATE, &self.moderate),
            (consequences::SEVERE, &self.severe),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::AgeTrackKind;
    use crate::track::StressBox;

    fn stress(pattern: &[bool]) -> Track<StressBox> {
        Track {
            boxes: pattern.iter().map(|&checked| StressBox { checked }).collect(),
            max: pattern.len(),
        }
    }

    fn filled(text: &str) -> ConsequenceSlot {
        ConsequenceSlot {
            value: text.to_string(),
            ..ConsequenceSlot::shown()
        }
    }

    #[test]
    fn empty_list_is_zero() {
        assert_eq!(aggregate_capacity(&[]), CapacityPool::default());
    }

    #[test]
    fn disabled_pool_contributes_nothing() {
        let track = stress(&[true, true, true]);
        let pools = [
            growing_pool(&track, false),
            fixed_box_pool(&track, 2, false),
        ];
        assert_eq!(aggregate_capacity(&pools), CapacityPool::default());
    }

    #[test]
    fn fixed_boxes_scale_by_value() {
        let track = stress(&[true, false, true, false]);
        let pool = fixed_box_pool(&track, 2, true);
        assert_eq!((pool.capacity, pool.used), (8, 4));

        // Zero-value track stays out of the total.
        let pool = fixed_box_pool(&track, 0, true);
        assert_eq!((pool.capacity, pool.used), (0, 0));
    }

    #[test]
    fn growing_track_after_resize() {
        let track = stress(&[true, false, true]).resized(5, StressBox::default);
        let pool = aggregate_capacity(&[growing_pool(&track, true)]);
        assert_eq!(pool.capacity, 15);
        assert_eq!(pool.used, 4);
        assert_eq!(pool.value(), 11);
    }

    #[test]
    fn ladder_counts_active_rungs_only() {
        let mut ladder = Track::filled(10, Rung::default);
        ladder.boxes[0].checked = true;
        ladder.boxes[7].checked = true;
        ladder.max = 5;
        let pool = ladder_pool(&ladder, 3, true);
        assert_eq!((pool.capacity, pool.used), (15, 3));
    }

    #[test]
    fn population_counts_expended_only() {
        let track = Track {
            boxes: vec![
                TriStateBox::Expended,
                TriStateBox::Committed,
                TriStateBox::Expended,
            ],
            max: 3,
        };
        let pool = population_pool(&track, true);
        assert_eq!((pool.capacity, pool.used), (6, 4));
    }

    #[test]
    fn treated_consequence_still_used() {
        let mut slots = Consequences::default();
        slots.moderate = filled("Broken arm");
        slots.moderate.treated = true;
        let pool = consequence_pool(&slots, true);
        // minor2 is hidden: 2 + 4 + 6.
        assert_eq!(pool.capacity, 12);
        assert_eq!(pool.used, 4);
        assert!(!slots.moderate.free_invoke_available());
    }

    #[test]
    fn second_minor_only_when_visible() {
        let mut slots = Consequences::default();
        slots.minor2 = filled("Winded");
        slots.minor2.visible = false;
        assert_eq!(consequence_pool(&slots, true).used, 0);
        slots.minor2.visible = true;
        let pool = consequence_pool(&slots, true);
        assert_eq!((pool.capacity, pool.used), (14, 2));
    }

    #[test]
    fn blank_text_is_not_filled() {
        let slot = filled("   ");
        assert!(!slot.is_filled());
        assert!(!slot.free_invoke_available());
        assert!(filled("Shaken").free_invoke_available());
    }

    #[test]
    fn age_wounds_skip_passed_and_scarred() {
        let mut age = AgeTrack::new(AgeTrackKind::Scion);
        age.set_passed(0, true).unwrap();
        age.set_scar(4, true).unwrap();
        age.set_wound(1, true).unwrap();
        let pool = age_wound_pool(&age, true);
        assert_eq!((pool.capacity, pool.used), (3, 1));
    }

    #[test]
    fn value_goes_negative() {
        let pool = aggregate_capacity(&[
            PoolContribution::new(3, 5),
            PoolContribution::new(10, 10).enabled_if(false),
        ]);
        assert_eq!(pool.value(), -2);
        assert!(pool.is_overwhelmed());
    }
}
