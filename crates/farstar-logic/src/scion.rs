//! Faction-Scion sheet — a Scion and the faction they lead, on one record.
//!
//! The Scion half carries a skill pyramid, a stress track and an age track.
//! The faction half carries a capability pyramid, a people track sized by
//! the People capability, and stunts that feed refresh.

use serde::{Deserialize, Serialize};

use crate::age::{scion_stages, AgeTrack};
use crate::capacity::{aggregate_capacity, fixed_box_pool, population_pool, CapacityPool};
use crate::constants::faction;
use crate::pyramid::{validate_pyramid, PyramidPolicy, PyramidValidation, RatedList};
use crate::settings::CampaignSettings;
use crate::track::{serialize_indexed, StressBox, TriStateBox, Track};

/// Named stunt. Only counted here; its effect is applied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stunt {
    pub name: String,
    pub description: String,
}

impl Stunt {
    /// A stunt slot with a name or description counts toward refresh.
    pub fn is_filled(&self) -> bool {
        !self.name.trim().is_empty() || !self.description.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scion {
    pub skills: RatedList,
    pub stress: Track<StressBox>,
    #[serde(with = "scion_stages")]
    pub age_track: AgeTrack,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Faction {
    pub capabilities: RatedList,
    #[serde(serialize_with = "serialize_indexed")]
    pub people_track: Track<TriStateBox>,
    pub stunts: Vec<Stunt>,
}

impl Faction {
    pub fn stunt_count(&self) -> u32 {
        self.stunts.iter().filter(|s| s.is_filled()).count() as u32
    }

    pub fn people_rating(&self) -> i32 {
        self.capabilities.rank_of(faction::PEOPLE)
    }

    /// People track length for the current People rating.
    pub fn people_track_size(&self) -> usize {
        self.people_rating().max(0) as usize
    }
}

/// Stored faction-scion record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionScion {
    pub scion: Scion,
    pub faction: Faction,
}

/// Computed values for the faction-scion sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionScionDerived {
    pub skill_validation: PyramidValidation,
    pub capability_validation: PyramidValidation,
    pub total_skill_points: i32,
    pub total_capability_points: i32,
    pub ages_passed: usize,
    pub current_age_stage: Option<String>,
    pub stunt_count: u32,
    pub refresh: i32,
    pub stress: CapacityPool,
    pub people: CapacityPool,
}

impl FactionScion {
    pub fn validate_skill_pyramid(&self, settings: &CampaignSettings) -> PyramidValidation {
        validate_pyramid(
            &self.scion.skills.items,
            settings.max_skill,
            0,
            &PyramidPolicy::skills(),
        )
    }

    /// Capabilities are capped at the milestone-adjusted maximum. People
    /// may not drop below 0, the rest not below -1.
    pub fn validate_capability_pyramid(&self, settings: &CampaignSettings) -> PyramidValidation {
        validate_pyramid(
            &self.faction.capabilities.items,
            settings.max_capability(),
            0,
            &PyramidPolicy::capabilities(),
        )
    }

    /// Size the people track to the People rating and the stress track to
    /// its configured max, keeping the state of surviving boxes.
    pub fn sync_tracks(&mut self) {
        let people = self.faction.people_track_size();
        self.faction.people_track.resize(people, TriStateBox::default);

        let stress = self.scion.stress.max;
        self.scion.stress.resize(stress, StressBox::default);
    }

    pub fn refresh(&self, settings: &CampaignSettings) -> i32 {
        settings.refresh(self.faction.stunt_count())
    }

    pub fn total_skill_points(&self) -> i32 {
        self.scion.skills.total_points()
    }

    pub fn total_capability_points(&self) -> i32 {
        self.faction.capabilities.total_points()
    }

    /// Age stages passed; each one is a skill advancement.
    pub fn ages_passed(&self) -> usize {
        self.scion.age_track.passed_count()
    }

    pub fn derive(&self, settings: &CampaignSettings) -> FactionScionDerived {
        let people_track = self
            .faction
            .people_track
            .clone()
            .resized(self.faction.people_track_size(), TriStateBox::default);
        let derived = FactionScionDerived {
            skill_validation: self.validate_skill_pyramid(settings),
            capability_validation: self.validate_capability_pyramid(settings),
            total_skill_points: self.total_skill_points(),
            total_capability_points: self.total_capability_points(),
            ages_passed: self.ages_passed(),
            current_age_stage: self
                .scion
                .age_track
                .current_stage_label()
                .map(str::to_string),
            stunt_count: self.faction.stunt_count(),
            refresh: self.refresh(settings),
            stress: aggregate_capacity(&[fixed_box_pool(&self.scion.stress, 1, true)]),
            people: aggregate_capacity(&[population_pool(&people_track, true)]),
        };
        log::debug!(
            "faction-scion: refresh {}, skills valid {}, capabilities valid {}",
            derived.refresh,
            derived.skill_validation.valid,
            derived.capability_validation.valid
        );
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyramid::RatedItem;

    fn rated(entries: &[(&str, i32)]) -> RatedList {
        RatedList::new(
            entries
                .iter()
                .map(|&(name, rank)| RatedItem::new(name, rank))
                .collect(),
        )
    }

    fn sheet() -> FactionScion {
        let mut sheet = FactionScion::default();
        sheet.scion.skills = rated(&[("Fight", 3), ("Notice", 2), ("Will", 2), ("Lore", 1), ("Craft", 1)]);
        sheet.faction.capabilities = rated(&[("People", 2), ("Wealth", 1), ("Reach", 1)]);
        sheet.scion.stress.max = 3;
        sheet.sync_tracks();
        sheet
    }

    #[test]
    fn sync_builds_missing_tracks() {
        let sheet = sheet();
        assert_eq!(sheet.scion.stress.boxes.len(), 3);
        assert_eq!(sheet.faction.people_track.len(), 2);
    }

    #[test]
    fn people_track_keeps_state_on_regrow() {
        let mut sheet = sheet();
        sheet.faction.people_track.boxes[1] = TriStateBox::Committed;
        sheet.faction.capabilities.items[0].rank = 4;
        sheet.sync_tracks();
        assert_eq!(sheet.faction.people_track.len(), 4);
        assert_eq!(sheet.faction.people_track.boxes[1], TriStateBox::Committed);

        sheet.faction.capabilities.items[0].rank = -1;
        sheet.sync_tracks();
        assert!(sheet.faction.people_track.is_empty());
    }

    #[test]
    fn stress_track_follows_max() {
        let mut sheet = sheet();
        sheet.scion.stress.boxes[0].checked = true;
        sheet.scion.stress.max = 5;
        sheet.sync_tracks();
        assert_eq!(sheet.scion.stress.boxes.len(), 5);
        assert!(sheet.scion.stress.boxes[0].checked);
    }

    #[test]
    fn skill_cap_comes_from_settings() {
        let mut sheet = sheet();
        let mut settings = CampaignSettings::default();
        assert!(sheet.validate_skill_pyramid(&settings).valid);

        sheet.scion.skills.items[0].rank = 5;
        assert!(!sheet.validate_skill_pyramid(&settings).valid);
        settings.max_skill = 5;
        assert!(sheet.validate_skill_pyramid(&settings).valid);
    }

    #[test]
    fn capability_cap_rises_with_major_milestones() {
        let mut sheet = sheet();
        sheet.faction.capabilities.items[0].rank = 4;
        let mut settings = CampaignSettings::default();
        let result = sheet.validate_capability_pyramid(&settings);
        assert!(!result.valid);
        assert_eq!(result.messages(), vec!["People rating 4 exceeds maximum of 3".to_string()]);

        settings.major_milestones = 1;
        assert!(sheet.validate_capability_pyramid(&settings).valid);
    }

    #[test]
    fn negative_people_is_rejected() {
        let mut sheet = sheet();
        sheet.faction.capabilities.items[0].rank = -1;
        let result = sheet.validate_capability_pyramid(&CampaignSettings::default());
        assert!(!result.valid);
    }

    #[test]
    fn blank_stunts_do_not_count() {
        let mut sheet = sheet();
        sheet.faction.stunts = vec![
            Stunt { name: "Ace Pilot".into(), ..Stunt::default() },
            Stunt::default(),
            Stunt { description: "+2 to Notice at night".into(), ..Stunt::default() },
        ];
        assert_eq!(sheet.faction.stunt_count(), 2);
    }

    #[test]
    fn refresh_drops_past_three_stunts() {
        let mut sheet = sheet();
        sheet.faction.stunts = (0..5)
            .map(|i| Stunt { name: format!("Stunt {i}"), ..Stunt::default() })
            .collect();
        let settings = CampaignSettings {
            significant_milestones: 1,
            ..CampaignSettings::default()
        };
        assert_eq!(sheet.refresh(&settings), 2);
    }

    #[test]
    fn derive_rolls_everything_up() {
        let mut sheet = sheet();
        sheet.scion.age_track.set_passed(0, true).unwrap();
        sheet.scion.stress.boxes[1].checked = true;
        let derived = sheet.derive(&CampaignSettings::default());
        assert_eq!(derived.total_skill_points, 9);
        assert_eq!(derived.total_capability_points, 4);
        assert_eq!(derived.ages_passed, 1);
        assert_eq!(derived.current_age_stage.as_deref(), Some("Seasoned"));
        assert_eq!(derived.refresh, 3);
        assert_eq!((derived.stress.capacity, derived.stress.used), (3, 1));
        assert_eq!(derived.people.capacity, 3);
    }

    #[test]
    fn loads_and_writes_host_snapshot() {
        let json = r#"{
            "scion": {
                "ageTrack": {
                    "youthful": { "label": "Youthful", "passed": true },
                    "seasoned": { "label": "Seasoned", "passed": true },
                    "older": { "label": "Older", "wound": true }
                }
            },
            "faction": {
                "capabilities": [{ "name": "People", "rank": 3 }],
                "peopleTrack": { "boxes": [{ "value": 1, "expended": true }] }
            }
        }"#;
        let sheet: FactionScion = serde_json::from_str(json).unwrap();
        assert_eq!(sheet.ages_passed(), 2);
        assert!(sheet.scion.age_track.stages[2].wound);

        let derived = sheet.derive(&CampaignSettings::default());
        assert_eq!(derived.current_age_stage.as_deref(), Some("Older"));
        assert_eq!(derived.people, CapacityPool { capacity: 6, used: 1 });

        let mut synced = sheet;
        synced.sync_tracks();
        let written = serde_json::to_value(&synced).unwrap();
        assert_eq!(written["scion"]["ageTrack"]["seasoned"]["passed"], true);
        assert_eq!(written["faction"]["peopleTrack"]["boxes"][2]["value"], 3);
    }
}
