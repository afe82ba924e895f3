//! Age track — generational aging with passed, wound and scar marks.
//!
//! An age track is a short fixed run of life stages, youngest first.
//! Each stage has four flags:
//!
//! - `passed`: the character has aged beyond this stage. Stages are passed
//!   youngest first and un-passed newest first.
//! - `scar`: the stage is lost for good. Scars accumulate from the oldest
//!   stage backwards and are removed youngest first.
//! - `wound` / `free_invoke_used`: per-stage marks with no ordering rules.
//!   Clearing a wound also clears its free invoke.
//!
//! Every transition is atomic: a rejected call leaves the track untouched.
//!
//! ```
//! use farstar_logic::age::{AgeTrack, AgeTrackKind};
//!
//! let mut track = AgeTrack::new(AgeTrackKind::Scion);
//! assert!(track.set_passed(2, true).is_err());
//! track.set_passed(0, true).unwrap();
//! assert_eq!(track.current_stage(), Some(1));
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::age_stages;

/// Which stage sequence a track uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeTrackKind {
    /// Scions and threats: youthful through ancient.
    Scion,
    /// Named NPCs: a child stage, then youthful through ancient.
    Npc,
}

impl AgeTrackKind {
    pub fn stage_keys(self) -> &'static [&'static str] {
        match self {
            Self::Scion => &age_stages::SCION,
            Self::Npc => &age_stages::NPC,
        }
    }
}

/// One life stage on an age track. Stored under its key, so the key
/// itself is not part of the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgeStage {
    #[serde(skip)]
    pub key: String,
    pub label: String,
    pub age_range: String,
    pub passed: bool,
    pub wound: bool,
    pub free_invoke_used: bool,
    pub scar: bool,
}

impl AgeStage {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: age_stages::label(key).to_string(),
            age_range: String::new(),
            passed: false,
            wound: false,
            free_invoke_used: false,
            scar: false,
        }
    }

    /// Neither passed nor scarred, so its wound box still shows.
    pub fn is_open(&self) -> bool {
        !self.passed && !self.scar
    }
}

/// Ordered transition that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeAction {
    Pass,
    Unpass,
    Scar,
    Unscar,
}

impl fmt::Display for AgeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Unpass => "clear passed on",
            Self::Scar => "scar",
            Self::Unscar => "clear the scar on",
        })
    }
}

/// A rejected age track operation. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgeTrackError {
    /// The stage named in `blocking` has to change first.
    #[error("{action} {blocking} before {stage}")]
    OrderViolation {
        action: AgeAction,
        stage: String,
        blocking: String,
    },
    #[error("no age stage at index {index} (track has {len})")]
    StageOutOfRange { index: usize, len: usize },
    #[error("generational aging applies to NPC age tracks only")]
    NotNpcTrack,
}

/// Whether each stage's passed/scar box may be clicked right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAvailability {
    pub can_check_passed: bool,
    pub can_check_scar: bool,
}

/// Where an NPC's age falls on its track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgePosition {
    /// Born in a later generation than the current one.
    Unborn,
    Stage(usize),
    /// Older than the last stage.
    BeyondTrack,
}

/// Generational age of an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcAge {
    pub age_in_generations: i32,
    pub position: AgePosition,
    pub is_deceased: bool,
    /// Generation in which the NPC aged past its last reachable stage.
    pub death_generation: Option<i32>,
}

/// Life stages of one character, youngest first.
///
/// Stored as a map from stage key to stage record. The map does not say
/// which stage sequence it holds, so the owning field picks one with
/// `#[serde(with = "scion_stages")]` or `#[serde(with = "npc_stages")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeTrack {
    pub kind: AgeTrackKind,
    pub stages: Vec<AgeStage>,
}

impl Default for AgeTrack {
    fn default() -> Self {
        Self::new(AgeTrackKind::Scion)
    }
}

impl AgeTrack {
    /// Fresh track with every flag cleared.
    pub fn new(kind: AgeTrackKind) -> Self {
        Self {
            kind,
            stages: kind.stage_keys().iter().map(|key| AgeStage::new(key)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.key == key)
    }

    /// Mark or clear `passed`.
    ///
    /// Passing needs every younger stage passed, and clears the stage's
    /// wound, free invoke and scar. Clearing needs no older stage passed
    /// and touches nothing else.
    pub fn set_passed(&mut self, index: usize, passed: bool) -> Result<(), AgeTrackError> {
        self.check_index(index)?;
        if passed {
            if let Some(blocking) = (0..index).find(|&i| !self.stages[i].passed) {
                return Err(self.violation(AgeAction::Pass, index, blocking));
            }
            let stage = &mut self.stages[index];
            stage.passed = true;
            stage.wound = false;
            stage.free_invoke_used = false;
            stage.scar = false;
        } else {
            if let Some(blocking) = (index + 1..self.len()).rev().find(|&i| self.stages[i].passed) {
                return Err(self.violation(AgeAction::Unpass, index, blocking));
            }
            self.stages[index].passed = false;
        }
        Ok(())
    }

    /// Mark or clear `scar`.
    ///
    /// Scarring needs every older stage scarred, and clears the stage's
    /// wound, free invoke and passed marks. Clearing needs no younger stage
    /// scarred and touches nothing else.
    pub fn set_scar(&mut self, index: usize, scar: bool) -> Result<(), AgeTrackError> {
        self.check_index(index)?;
        if scar {
            if let Some(blocking) = (index + 1..self.len()).rev().find(|&i| !self.stages[i].scar) {
                return Err(self.violation(AgeAction::Scar, index, blocking));
            }
            let stage = &mut self.stages[index];
            stage.scar = true;
            stage.wound = false;
            stage.free_invoke_used = false;
            stage.passed = false;
        } else {
            if let Some(blocking) = (0..index).find(|&i| self.stages[i].scar) {
                return Err(self.violation(AgeAction::Unscar, index, blocking));
            }
            self.stages[index].scar = false;
        }
        Ok(())
    }

    /// Mark or clear a wound. Clearing also clears the free invoke.
    pub fn set_wound(&mut self, index: usize, wound: bool) -> Result<(), AgeTrackError> {
        self.check_index(index)?;
        let stage = &mut self.stages[index];
        stage.wound = wound;
        if !wound {
            stage.free_invoke_used = false;
        }
        Ok(())
    }

    pub fn set_free_invoke_used(&mut self, index: usize, used: bool) -> Result<(), AgeTrackError> {
        self.check_index(index)?;
        self.stages[index].free_invoke_used = used;
        Ok(())
    }

    pub fn toggle_passed(&mut self, index: usize) -> Result<(), AgeTrackError> {
        let current = self.stage(index)?.passed;
        self.set_passed(index, !current)
    }

    pub fn toggle_scar(&mut self, index: usize) -> Result<(), AgeTrackError> {
        let current = self.stage(index)?.scar;
        self.set_scar(index, !current)
    }

    pub fn toggle_wound(&mut self, index: usize) -> Result<(), AgeTrackError> {
        let current = self.stage(index)?.wound;
        self.set_wound(index, !current)
    }

    pub fn toggle_free_invoke(&mut self, index: usize) -> Result<(), AgeTrackError> {
        let current = self.stage(index)?.free_invoke_used;
        self.set_free_invoke_used(index, !current)
    }

    /// Stage after the newest passed one; `None` once the last is passed.
    pub fn current_stage(&self) -> Option<usize> {
        let next = self.stages.iter().rposition(|s| s.passed).map_or(0, |i| i + 1);
        (next < self.len()).then_some(next)
    }

    pub fn current_stage_label(&self) -> Option<&str> {
        self.current_stage().map(|i| self.stages[i].label.as_str())
    }

    pub fn passed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.passed).count()
    }

    /// Scars counted contiguously from the oldest stage.
    pub fn trailing_scar_count(&self) -> usize {
        self.stages.iter().rev().take_while(|s| s.scar).count()
    }

    /// Oldest stage index still reachable; -1 when every stage is scarred.
    pub fn max_reachable_index(&self) -> i32 {
        self.len() as i32 - 1 - self.trailing_scar_count() as i32
    }

    /// Which passed/scar boxes can be clicked, per stage.
    pub fn availability(&self) -> Vec<StageAvailability> {
        let next_passed = self.stages.iter().rposition(|s| s.passed).map_or(0, |i| i + 1);
        let first_scarred = self
            .stages
            .iter()
            .position(|s| s.scar)
            .unwrap_or(self.len());
        self.stages
            .iter()
            .enumerate()
            .map(|(i, stage)| StageAvailability {
                can_check_passed: i == next_passed || stage.passed,
                can_check_scar: i + 1 == first_scarred || stage.scar,
            })
            .collect()
    }

    /// Age of an NPC born in `birth_generation`, one stage per generation.
    pub fn npc_age(
        &self,
        birth_generation: i32,
        current_generation: i32,
    ) -> Result<NpcAge, AgeTrackError> {
        if self.kind != AgeTrackKind::Npc {
            return Err(AgeTrackError::NotNpcTrack);
        }

        let age_in_generations = current_generation.saturating_sub(birth_generation);
        let len = self.len() as i32;
        let (position, index) = if age_in_generations < 0 {
            (AgePosition::Unborn, -1)
        } else if age_in_generations < len {
            (AgePosition::Stage(age_in_generations as usize), age_in_generations)
        } else {
            (AgePosition::BeyondTrack, len)
        };

        let max_index = self.max_reachable_index();
        let is_deceased = index > max_index;
        Ok(NpcAge {
            age_in_generations,
            position,
            is_deceased,
            death_generation: is_deceased
                .then(|| birth_generation.saturating_add(max_index).saturating_add(1)),
        })
    }

    fn stage(&self, index: usize) -> Result<&AgeStage, AgeTrackError> {
        self.stages.get(index).ok_or(AgeTrackError::StageOutOfRange {
            index,
            len: self.len(),
        })
    }

    fn check_index(&self, index: usize) -> Result<(), AgeTrackError> {
        self.stage(index).map(|_| ())
    }

    fn violation(&self, action: AgeAction, index: usize, blocking: usize) -> AgeTrackError {
        let error = AgeTrackError::OrderViolation {
            action,
            stage: self.stages[index].label.clone(),
            blocking: self.stages[blocking].label.clone(),
        };
        log::warn!("age track: {error}");
        error
    }
}

/// Build a track of `kind` from stage records keyed by stage name.
/// Missing stages start fresh; keys outside the sequence are dropped.
fn from_keyed(kind: AgeTrackKind, mut stored: HashMap<String, AgeStage>) -> AgeTrack {
    let stages = kind
        .stage_keys()
        .iter()
        .map(|&key| {
            let mut stage = stored.remove(key).unwrap_or_default();
            stage.key = key.to_string();
            if stage.label.is_empty() {
                stage.label = age_stages::label(key).to_string();
            }
            stage
        })
        .collect();
    if !stored.is_empty() {
        log::debug!("age track: ignoring stages {:?}", stored.keys().collect::<Vec<_>>());
    }
    AgeTrack { kind, stages }
}

fn serialize_keyed<S: Serializer>(track: &AgeTrack, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(track.len()))?;
    for stage in &track.stages {
        map.serialize_entry(&stage.key, stage)?;
    }
    map.end()
}

fn deserialize_keyed<'de, D: Deserializer<'de>>(
    kind: AgeTrackKind,
    deserializer: D,
) -> Result<AgeTrack, D::Error> {
    let stored = HashMap::<String, AgeStage>::deserialize(deserializer)?;
    Ok(from_keyed(kind, stored))
}

/// Keyed storage for Scion and threat age tracks.
pub mod scion_stages {
    use serde::{Deserializer, Serializer};

    use super::{AgeTrack, AgeTrackKind};

    pub fn serialize<S: Serializer>(track: &AgeTrack, serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize_keyed(track, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AgeTrack, D::Error> {
        super::deserialize_keyed(AgeTrackKind::Scion, deserializer)
    }
}

/// Keyed storage for named NPC age tracks.
pub mod npc_stages {
    use serde::{Deserializer, Serializer};

    use super::{AgeTrack, AgeTrackKind};

    pub fn serialize<S: Serializer>(track: &AgeTrack, serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize_keyed(track, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AgeTrack, D::Error> {
        super::deserialize_keyed(AgeTrackKind::Npc, deserializer)
    }
}
