//! Named NPCs — minor characters who age one stage per generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::age::{
    npc_stages, AgePosition, AgeTrack, AgeTrackError, AgeTrackKind, NpcAge, StageAvailability,
};
use crate::dice::{roll_fate, RollOutcome};
use crate::format::Signed;
use crate::settings::CampaignSettings;

/// Stored named NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamedNpc {
    pub name: String,
    pub aspect: String,
    /// Notable skill; blank when the NPC has none worth rolling.
    pub skill_name: String,
    pub skill_value: i32,
    pub birth_generation: i32,
    #[serde(with = "npc_stages")]
    pub age_track: AgeTrack,
}

impl Default for NamedNpc {
    fn default() -> Self {
        Self {
            name: String::new(),
            aspect: String::new(),
            skill_name: String::new(),
            skill_value: 0,
            birth_generation: 0,
            age_track: AgeTrack::new(AgeTrackKind::Npc),
        }
    }
}

/// Computed values for the NPC sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedNpcDerived {
    pub age: NpcAge,
    /// Label of the stage the NPC is living through, or "Unknown".
    pub current_age_label: String,
    pub availability: Vec<StageAvailability>,
}

impl NamedNpc {
    pub fn new(name: impl Into<String>, birth_generation: i32) -> Self {
        Self {
            name: name.into(),
            birth_generation,
            ..Self::default()
        }
    }

    pub fn age(&self, settings: &CampaignSettings) -> Result<NpcAge, AgeTrackError> {
        self.age_track
            .npc_age(self.birth_generation, settings.generation_number)
    }

    fn has_skill(&self) -> bool {
        !self.skill_name.trim().is_empty()
    }

    /// Skill line for the sheet, e.g. `Gunnery +2`.
    pub fn skill_summary(&self) -> Option<String> {
        self.has_skill()
            .then(|| format!("{} {}", self.skill_name, Signed(self.skill_value)))
    }

    /// Roll 4dF plus the notable skill. `None` when no skill is named.
    pub fn roll_skill(&self, rng: &mut impl Rng) -> Option<RollOutcome> {
        if !self.has_skill() {
            return None;
        }
        let outcome = roll_fate(self.skill_value, rng);
        log::debug!("{}: {} -> {}", self.name, self.skill_name, outcome.final_result);
        Some(outcome)
    }

    /// Scars shorten the NPC's life from the oldest stage backwards.
    pub fn toggle_scar(&mut self, index: usize) -> Result<(), AgeTrackError> {
        self.age_track.toggle_scar(index)
    }

    pub fn derive(&self, settings: &CampaignSettings) -> Result<NamedNpcDerived, AgeTrackError> {
        let age = self.age(settings)?;
        let current_age_label = match age.position {
            AgePosition::Stage(i) => self.age_track.stages[i].label.clone(),
            _ => "Unknown".to_string(),
        };
        Ok(NamedNpcDerived {
            age,
            current_age_label,
            availability: self.age_track.availability(),
        })
    }
}
