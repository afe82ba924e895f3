//! Campaign-wide settings.
//!
//! The host keeps a handful of world-scoped numbers (current generation,
//! milestone counters, rating caps). The engine never looks them up
//! itself: callers build a [`CampaignSettings`] and pass it to every
//! function that needs one.
//!
//! ```
//! use farstar_logic::settings::{validate_settings, CampaignSettings};
//!
//! let mut settings = CampaignSettings::default();
//! settings.generation_number = 4;
//! settings.major_milestones = 2;
//! assert!(validate_settings(&settings).is_empty());
//! assert_eq!(settings.max_capability(), 5);
//! assert_eq!(settings.expected_colony_total(), 10);
//! ```

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::constants::{colony, faction};

/// World settings that feed derived sheet values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignSettings {
    /// Current generation of Scions (1-based).
    pub generation_number: i32,
    /// Significant milestones reached; each adds a point of faction refresh.
    pub significant_milestones: i32,
    /// Major milestones reached; each raises the capability cap by one.
    pub major_milestones: i32,
    /// Cap on Scion skill ratings.
    pub max_skill: i32,
    /// Capability cap before major milestones.
    pub base_max_capability: i32,
    /// Extra diagnostics in the host console.
    pub debug_mode: bool,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            generation_number: 1,
            significant_milestones: 0,
            major_milestones: 0,
            max_skill: 4,
            base_max_capability: 3,
            debug_mode: false,
        }
    }
}

const GENERATION_RANGE: RangeInclusive<i32> = 1..=100;
const MILESTONE_RANGE: RangeInclusive<i32> = 0..=100;
const CAP_RANGE: RangeInclusive<i32> = 1..=10;

impl CampaignSettings {
    /// Capability cap after major milestones.
    pub fn max_capability(&self) -> i32 {
        self.base_max_capability + self.major_milestones
    }

    /// Point total a colony's attribute column should add up to.
    pub fn expected_colony_total(&self) -> i32 {
        colony::BASE_TOTAL + self.generation_number
    }

    /// Highest Population rank the current generation allows.
    pub fn max_population_rank(&self) -> i32 {
        self.generation_number.div_euclid(2) + 1
    }

    /// Faction refresh for the given stunt count.
    pub fn refresh(&self, stunt_count: u32) -> i32 {
        refresh(self.significant_milestones, stunt_count)
    }
}

/// Faction refresh: base 3, plus significant milestones, minus one per
/// stunt beyond the free three. Never below 1.
pub fn refresh(significant_milestones: i32, stunt_count: u32) -> i32 {
    let extra_stunts = stunt_count.saturating_sub(faction::FREE_STUNTS) as i32;
    (faction::BASE_REFRESH + significant_milestones - extra_stunts).max(faction::MIN_REFRESH)
}

/// A setting outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("generation number {0} is outside 1..=100")]
    InvalidGeneration(i32),
    #[error("significant milestones {0} is outside 0..=100")]
    InvalidSignificantMilestones(i32),
    #[error("major milestones {0} is outside 0..=100")]
    InvalidMajorMilestones(i32),
    #[error("max skill {0} is outside 1..=10")]
    InvalidMaxSkill(i32),
    #[error("base max capability {0} is outside 1..=10")]
    InvalidBaseMaxCapability(i32),
}

/// Validate campaign settings, returning all errors found.
pub fn validate_settings(settings: &CampaignSettings) -> Vec<SettingsError> {
    let mut errors = Vec::new();

    if !GENERATION_RANGE.contains(&settings.generation_number) {
        errors.push(SettingsError::InvalidGeneration(settings.generation_number));
    }
    if !MILESTONE_RANGE.contains(&settings.significant_milestones) {
        errors.push(SettingsError::InvalidSignificantMilestones(
            settings.significant_milestones,
        ));
    }
    if !MILESTONE_RANGE.contains(&settings.major_milestones) {
        errors.push(SettingsError::InvalidMajorMilestones(
            settings.major_milestones,
        ));
    }
    if !CAP_RANGE.contains(&settings.max_skill) {
        errors.push(SettingsError::InvalidMaxSkill(settings.max_skill));
    }
    if !CAP_RANGE.contains(&settings.base_max_capability) {
        errors.push(SettingsError::InvalidBaseMaxCapability(
            settings.base_max_capability,
        ));
    }

    errors
}
