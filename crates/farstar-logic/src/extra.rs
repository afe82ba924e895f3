//! Extras — aspects, ladders, skills and tracks attached to a sheet.
//!
//! Every extra carries a row of free-invoke boxes. Depending on its kind
//! it also carries a ladder, a rollable skill or a checkbox track. Sizes
//! change through +/- adjusters that clamp into fixed bounds; shrinking
//! drops boxes off the end.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::capacity::{aggregate_capacity, fixed_box_pool, growing_pool, CapacityPool};
use crate::constants::limits;
use crate::dice::{roll_fate, RollOutcome};
use crate::track::{adjust_size, InvokeBox, Rung, StressBox, Track};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraKind {
    #[default]
    Aspect,
    Ladder,
    Skill,
    Track,
    /// Track whose box `i` is worth `i + 1`.
    GrowingTrack,
}

/// An extra item. Invokes, rungs and track boxes are stored as plain
/// lists; see [`StoredExtra`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredExtra", into = "StoredExtra")]
pub struct Extra {
    pub kind: ExtraKind,
    pub name: String,
    pub invokes: Track<InvokeBox>,
    pub ladder_label: String,
    pub rungs: Track<Rung>,
    pub skill_name: String,
    pub skill_value: i32,
    pub track_label: String,
    /// Value of every box on a plain track.
    pub track_value: i32,
    pub boxes: Track<StressBox>,
}

impl Default for Extra {
    fn default() -> Self {
        Self::new(ExtraKind::Aspect, "")
    }
}

/// Track box as the extra sheet stores it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredTrackBox {
    checked: bool,
}

/// Stored layout of an extra: lists plus the rung count and track length
/// the sheet shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredExtra {
    kind: ExtraKind,
    name: String,
    invokes: Vec<InvokeBox>,
    ladder_label: String,
    rung_count: usize,
    rungs: Vec<Rung>,
    skill_name: String,
    skill_value: i32,
    track_label: String,
    track_value: i32,
    track_length: usize,
    boxes: Vec<StoredTrackBox>,
}

impl Default for StoredExtra {
    fn default() -> Self {
        Extra::default().into()
    }
}

impl From<StoredExtra> for Extra {
    fn from(stored: StoredExtra) -> Self {
        Self {
            kind: stored.kind,
            name: stored.name,
            invokes: Track {
                max: stored.invokes.len(),
                boxes: stored.invokes,
            },
            ladder_label: stored.ladder_label,
            rungs: Track {
                boxes: stored.rungs,
                max: stored.rung_count,
            },
            skill_name: stored.skill_name,
            skill_value: stored.skill_value,
            track_label: stored.track_label,
            track_value: stored.track_value,
            boxes: Track {
                boxes: stored
                    .boxes
                    .iter()
                    .map(|b| StressBox { checked: b.checked })
                    .collect(),
                max: stored.track_length,
            },
        }
    }
}

impl From<Extra> for StoredExtra {
    fn from(extra: Extra) -> Self {
        Self {
            kind: extra.kind,
            name: extra.name,
            invokes: extra.invokes.boxes,
            ladder_label: extra.ladder_label,
            rung_count: extra.rungs.max,
            rungs: extra.rungs.boxes,
            skill_name: extra.skill_name,
            skill_value: extra.skill_value,
            track_label: extra.track_label,
            track_value: extra.track_value,
            track_length: extra.boxes.max,
            boxes: extra
                .boxes
                .boxes
                .iter()
                .map(|b| StoredTrackBox { checked: b.checked })
                .collect(),
        }
    }
}

impl Extra {
    pub fn new(kind: ExtraKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            invokes: Track::default(),
            ladder_label: String::new(),
            rungs: Track::filled(limits::DEFAULT_EXTRA_RUNGS, Rung::default),
            skill_name: String::new(),
            skill_value: 0,
            track_label: String::new(),
            track_value: 1,
            boxes: Track::filled(1, StressBox::default),
        }
    }

    pub fn adjust_invokes(&mut self, delta: i32) {
        let size = adjust_size(self.invokes.max, delta, limits::EXTRA_INVOKES);
        self.invokes.resize(size, InvokeBox::default);
    }

    pub fn adjust_rung_count(&mut self, delta: i32) {
        let size = adjust_size(self.rungs.max, delta, limits::EXTRA_LADDER_RUNGS);
        self.rungs.resize(size, Rung::default);
    }

    pub fn adjust_track_length(&mut self, delta: i32) {
        let size = adjust_size(self.boxes.max, delta, limits::EXTRA_TRACK_LENGTH);
        self.boxes.resize(size, StressBox::default);
    }

    /// Free invokes not yet spent.
    pub fn available_invokes(&self) -> usize {
        self.invokes.len() - self.invokes.checked_count()
    }

    pub fn current_rung(&self) -> Option<usize> {
        self.rungs.first_unchecked()
    }

    /// Capacity of the checkbox track, or `None` for kinds without one.
    pub fn track_capacity(&self) -> Option<CapacityPool> {
        let pool = match self.kind {
            ExtraKind::Track => fixed_box_pool(&self.boxes, self.track_value, true),
            ExtraKind::GrowingTrack => growing_pool(&self.boxes, true),
            _ => return None,
        };
        Some(aggregate_capacity(&[pool]))
    }

    /// Roll the extra's skill. `None` when the skill has no name.
    pub fn roll_skill(&self, rng: &mut impl Rng) -> Option<RollOutcome> {
        if self.skill_name.trim().is_empty() {
            return None;
        }
        let outcome = roll_fate(self.skill_value, rng);
        log::debug!("{}: {} -> {}", self.name, self.skill_name, outcome.final_result);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn invokes_clamp_to_ten() {
        let mut extra = Extra::new(ExtraKind::Aspect, "Old Reactor");
        extra.adjust_invokes(-1);
        assert_eq!(extra.invokes.len(), 0);
        for _ in 0..12 {
            extra.adjust_invokes(1);
        }
        assert_eq!(extra.invokes.len(), 10);
        assert_eq!(extra.available_invokes(), 10);
    }

    #[test]
    fn spent_invokes_reduce_availability() {
        let mut extra = Extra::new(ExtraKind::Aspect, "Old Reactor");
        extra.adjust_invokes(3);
        extra.invokes.toggle(1);
        assert_eq!(extra.available_invokes(), 2);
        extra.adjust_invokes(-2);
        assert_eq!(extra.available_invokes(), 1);
    }

    #[test]
    fn ladder_shrink_drops_rungs() {
        let mut extra = Extra::new(ExtraKind::Ladder, "Alert Level");
        extra.rungs.boxes[4].checked = true;
        extra.adjust_rung_count(-1);
        extra.adjust_rung_count(1);
        assert_eq!(extra.rungs.len(), 5);
        assert!(!extra.rungs.boxes[4].checked);
        extra.adjust_rung_count(-10);
        assert_eq!(extra.rungs.len(), 1);
    }

    #[test]
    fn current_rung_skips_checked() {
        let mut extra = Extra::new(ExtraKind::Ladder, "Alert Level");
        extra.rungs.toggle(0);
        assert_eq!(extra.current_rung(), Some(1));
    }

    #[test]
    fn track_capacity_by_kind() {
        let mut extra = Extra::new(ExtraKind::Track, "Hull");
        extra.track_value = 2;
        extra.adjust_track_length(2);
        extra.boxes.toggle(0);
        assert_eq!(
            extra.track_capacity(),
            Some(CapacityPool { capacity: 6, used: 2 })
        );

        extra.kind = ExtraKind::GrowingTrack;
        assert_eq!(
            extra.track_capacity(),
            Some(CapacityPool { capacity: 6, used: 1 })
        );

        extra.kind = ExtraKind::Skill;
        assert_eq!(extra.track_capacity(), None);
    }

    #[test]
    fn track_length_stays_in_bounds() {
        let mut extra = Extra::new(ExtraKind::Track, "Hull");
        extra.adjust_track_length(-3);
        assert_eq!(extra.boxes.len(), 1);
        extra.adjust_track_length(30);
        assert_eq!(extra.boxes.len(), 10);
    }

    #[test]
    fn skill_roll_uses_skill_value() {
        let mut extra = Extra::new(ExtraKind::Skill, "Drone Swarm");
        let mut rng = StdRng::seed_from_u64(42);
        assert!(extra.roll_skill(&mut rng).is_none());

        extra.skill_name = "Survey".into();
        extra.skill_value = 2;
        let outcome = extra.roll_skill(&mut rng).unwrap();
        assert_eq!(outcome.modifier, 2);
        assert_eq!(outcome.final_result, outcome.total + 2);
    }

    #[test]
    fn kind_uses_host_names() {
        let extra: Extra =
            serde_json::from_str(r#"{ "kind": "growing-track", "name": "Fuel" }"#).unwrap();
        assert_eq!(extra.kind, ExtraKind::GrowingTrack);
        assert_eq!(extra.rungs.len(), 5);
    }

    #[test]
    fn loads_and_writes_host_lists() {
        let json = r#"{
            "kind": "ladder",
            "name": "Alert Level",
            "invokes": [{ "spent": true }, { "spent": false }],
            "rungCount": 3,
            "rungs": [{ "aspect": "Calm", "checked": true }, { "aspect": "Wary" }, { "aspect": "Armed" }],
            "trackLength": 2,
            "boxes": [{ "checked": true }, { "checked": false }]
        }"#;
        let extra: Extra = serde_json::from_str(json).unwrap();
        assert_eq!(extra.available_invokes(), 1);
        assert_eq!(extra.rungs.len(), 3);
        assert_eq!(extra.current_rung(), Some(1));
        assert_eq!(extra.boxes.checked_count(), 1);

        let written = serde_json::to_value(&extra).unwrap();
        assert_eq!(written["rungCount"], 3);
        assert_eq!(written["rungs"][0]["aspect"], "Calm");
        assert_eq!(written["trackLength"], 2);
        assert_eq!(written["boxes"][0]["checked"], true);
        assert_eq!(written["invokes"][0]["spent"], true);

        let restored: Extra = serde_json::from_value(written).unwrap();
        assert_eq!(restored, extra);
    }
}
