//! Threat sheet — a GM-built adversary assembled from optional sections.
//!
//! A threat can be anything from a plague to a rival faction, so every
//! section can be shown or hidden, and each harm-absorbing section opts in
//! or out of the threat's trauma total separately.
//!
//! | Section | Trauma contribution |
//! |---------|---------------------|
//! | single-point stress | `trauma_value` per box, per track |
//! | growing stress | box `i` worth `i + 1`, opt-in per track |
//! | consequences | 2 / 2 / 4 / 6 per visible slot |
//! | age track | 1 per stage not passed or scarred |
//! | ladders | `trauma_value` per active rung |
//!
//! Skill columns never contribute.

use serde::{Deserialize, Serialize};

use crate::age::{scion_stages, AgeTrack, AgeTrackKind};
use crate::capacity::{
    age_wound_pool, aggregate_capacity, consequence_pool, fixed_box_pool, growing_pool,
    ladder_pool, CapacityPool, Consequences, PoolContribution,
};
use crate::constants::limits;
use crate::track::{adjust_size, Rung, StressBox, Track};

/// A named skill slot on a threat column. Blank slots are placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatSkill {
    pub name: String,
    pub value: i32,
}

/// One of the two eight-slot skill columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillColumn {
    pub visible: bool,
    pub label: String,
    /// Slots shown on the sheet.
    pub skill_count: usize,
    pub skills: Vec<ThreatSkill>,
}

impl Default for SkillColumn {
    fn default() -> Self {
        Self {
            visible: false,
            label: String::new(),
            skill_count: 4,
            skills: Vec::new(),
        }
    }
}

impl SkillColumn {
    pub fn adjust_count(&mut self, delta: i32) {
        self.skill_count = adjust_size(self.skill_count, delta, limits::THREAT_SKILL_COUNT);
    }

    /// Slots within the shown count.
    pub fn shown(&self) -> &[ThreatSkill] {
        &self.skills[..self.skill_count.min(self.skills.len())]
    }

    fn pad(&mut self) {
        if self.skills.len() < limits::SKILL_COLUMN_SLOTS {
            self.skills.resize_with(limits::SKILL_COLUMN_SLOTS, ThreatSkill::default);
        }
    }
}

/// A stress track inside a threat section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreatStressTrack {
    pub visible: bool,
    pub label: String,
    /// Trauma per box on single-point tracks; 0 keeps the track out of
    /// the total.
    pub trauma_value: i32,
    /// Per-track opt-in, read on growing tracks only.
    pub counts_toward_trauma: bool,
    #[serde(flatten)]
    pub track: Track<StressBox>,
}

impl Default for ThreatStressTrack {
    fn default() -> Self {
        Self {
            visible: true,
            label: String::new(),
            trauma_value: 1,
            counts_toward_trauma: true,
            track: Track::filled(3, StressBox::default),
        }
    }
}

impl ThreatStressTrack {
    /// Change the box count by `delta`, keeping surviving box states.
    pub fn adjust_max(&mut self, delta: i32) {
        let max = adjust_size(self.track.max, delta, limits::THREAT_STRESS_MAX);
        self.track.resize(max, StressBox::default);
    }
}

/// Two stress tracks sharing a section toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StressSection {
    pub visible: bool,
    /// Section-wide opt-in, read on single-point stress only.
    pub counts_toward_trauma: bool,
    pub track1: ThreatStressTrack,
    pub track2: ThreatStressTrack,
}

impl Default for StressSection {
    fn default() -> Self {
        Self {
            visible: false,
            counts_toward_trauma: true,
            track1: ThreatStressTrack::default(),
            track2: ThreatStressTrack::default(),
        }
    }
}

impl StressSection {
    fn tracks_mut(&mut self) -> [&mut ThreatStressTrack; 2] {
        [&mut self.track1, &mut self.track2]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsequenceSection {
    pub visible: bool,
    pub counts_toward_trauma: bool,
    #[serde(flatten)]
    pub slots: Consequences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgeSection {
    pub visible: bool,
    pub counts_toward_trauma: bool,
    #[serde(rename = "stages", with = "scion_stages")]
    pub track: AgeTrack,
}

impl Default for AgeSection {
    fn default() -> Self {
        Self {
            visible: false,
            counts_toward_trauma: false,
            track: AgeTrack::new(AgeTrackKind::Scion),
        }
    }
}

/// A ladder of aspect rungs. Lowering the rung count hides rungs without
/// deleting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLadder", into = "StoredLadder")]
pub struct Ladder {
    pub visible: bool,
    pub label: String,
    pub counts_toward_trauma: bool,
    pub trauma_value: i32,
    /// Every stored rung; `max` is the rung count.
    pub rungs: Track<Rung>,
}

/// Stored form of [`Ladder`]: all rungs in one list plus the count shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredLadder {
    visible: bool,
    label: String,
    counts_toward_trauma: bool,
    trauma_value: i32,
    rung_count: usize,
    rungs: Vec<Rung>,
}

impl Default for StoredLadder {
    fn default() -> Self {
        Ladder::default().into()
    }
}

impl From<StoredLadder> for Ladder {
    fn from(stored: StoredLadder) -> Self {
        Self {
            visible: stored.visible,
            label: stored.label,
            counts_toward_trauma: stored.counts_toward_trauma,
            trauma_value: stored.trauma_value,
            rungs: Track {
                boxes: stored.rungs,
                max: stored.rung_count,
            },
        }
    }
}

impl From<Ladder> for StoredLadder {
    fn from(ladder: Ladder) -> Self {
        Self {
            visible: ladder.visible,
            label: ladder.label,
            counts_toward_trauma: ladder.counts_toward_trauma,
            trauma_value: ladder.trauma_value,
            rung_count: ladder.rungs.max,
            rungs: ladder.rungs.boxes,
        }
    }
}

impl Default for Ladder {
    fn default() -> Self {
        Self {
            visible: false,
            label: String::new(),
            counts_toward_trauma: false,
            trauma_value: 1,
            rungs: Track::filled(limits::DEFAULT_EXTRA_RUNGS, Rung::default),
        }
    }
}

impl Ladder {
    pub fn rung_count(&self) -> usize {
        self.rungs.max
    }

    pub fn adjust_rung_count(&mut self, delta: i32) {
        let count = adjust_size(self.rungs.max, delta, limits::THREAT_LADDER_RUNGS);
        self.rungs.set_window(count, Rung::default);
    }

    /// The topmost unchecked rung.
    pub fn current_rung(&self) -> Option<usize> {
        self.rungs.first_unchecked()
    }
}

/// Every optional section of a threat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModularSections {
    pub single_point_stress: StressSection,
    pub growing_stress: StressSection,
    pub consequences: ConsequenceSection,
    pub age_track: AgeSection,
    pub ladder1: Ladder,
    pub ladder2: Ladder,
    pub capabilities_column: SkillColumn,
    pub skills_column: SkillColumn,
}

/// Stored threat record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Threat {
    pub name: String,
    pub modular_sections: ModularSections,
}

/// Computed values for the threat sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatDerived {
    pub trauma: CapacityPool,
    /// Label of the current age stage; `None` when the age section is
    /// hidden or every stage is passed.
    pub current_age_stage: Option<String>,
}

impl Threat {
    /// Bring stored sections in line with their configured sizes: both
    /// skill columns get eight slots, stress tracks match their max and
    /// ladders hold at least their rung count.
    pub fn prepare(&mut self) {
        let sections = &mut self.modular_sections;
        sections.capabilities_column.pad();
        sections.skills_column.pad();

        for section in [&mut sections.single_point_stress, &mut sections.growing_stress] {
            for stress in section.tracks_mut() {
                let max = stress.track.max;
                stress.track.resize(max, StressBox::default);
            }
        }

        for ladder in [&mut sections.ladder1, &mut sections.ladder2] {
            let count = ladder.rungs.max;
            ladder.rungs.set_window(count, Rung::default);
        }
    }

    /// Each section's share of the trauma total, hidden ones disabled.
    pub fn trauma_pools(&self) -> Vec<PoolContribution> {
        let s = &self.modular_sections;
        let mut pools = Vec::new();

        let single = &s.single_point_stress;
        let single_on = single.visible && single.counts_toward_trauma;
        for stress in [&single.track1, &single.track2] {
            pools.push(fixed_box_pool(
                &stress.track,
                stress.trauma_value.max(0),
                single_on && stress.visible,
            ));
        }

        let growing = &s.growing_stress;
        for stress in [&growing.track1, &growing.track2] {
            pools.push(growing_pool(
                &stress.track,
                growing.visible && stress.visible && stress.counts_toward_trauma,
            ));
        }

        let consequences = &s.consequences;
        pools.push(consequence_pool(
            &consequences.slots,
            consequences.visible && consequences.counts_toward_trauma,
        ));

        let age = &s.age_track;
        pools.push(age_wound_pool(&age.track, age.visible && age.counts_toward_trauma));

        for ladder in [&s.ladder1, &s.ladder2] {
            pools.push(ladder_pool(
                &ladder.rungs,
                ladder.trauma_value.max(0),
                ladder.visible && ladder.counts_toward_trauma,
            ));
        }

        pools
    }

    pub fn derive(&self) -> ThreatDerived {
        let trauma = aggregate_capacity(&self.trauma_pools());
        let age = &self.modular_sections.age_track;
        let current_age_stage = if age.visible {
            age.track.current_stage_label().map(str::to_string)
        } else {
            None
        };
        log::debug!(
            "threat {}: trauma {}/{}",
            self.name,
            trauma.value(),
            trauma.capacity
        );
        ThreatDerived {
            trauma,
            current_age_stage,
        }
    }
}
