//! Colony sheet — attribute column and population track.
//!
//! Colony attributes follow the column rule: no rank may hold more
//! attributes than the rank directly below it, counting ranks 1 through 6.
//! Totals and the Population cap are advisory and only warn.
//!
//! The population track holds one tri-state box per Population rank (at
//! most six). Box `i` is worth `i + 1`; expended boxes are spent.

use serde::{Deserialize, Serialize};

use crate::capacity::{aggregate_capacity, population_pool, CapacityPool};
use crate::constants::colony;
use crate::pyramid::{
    validate_pyramid, PyramidPolicy, PyramidValidation, PyramidViolation, RankBounds, RatedList,
    RatedListError,
};
use crate::settings::CampaignSettings;
use crate::track::{serialize_indexed, TriStateBox, Track};

/// Rank window for colony attributes.
pub const RANK_BOUNDS: RankBounds = RankBounds::new(colony::MIN_RANK, colony::MAX_RANK);

/// Stored colony record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Colony {
    pub attributes: RatedList,
    #[serde(serialize_with = "serialize_indexed")]
    pub population_track: Track<TriStateBox>,
}

/// Everything the colony sheet shows that is computed, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColonyDerived {
    pub validation: PyramidValidation,
    pub population_rank: i32,
    pub max_population_rank: i32,
    /// Available population, for the token bar.
    pub population: CapacityPool,
}

impl Colony {
    pub fn new(attributes: RatedList) -> Self {
        let mut colony = Self {
            attributes,
            population_track: Track::default(),
        };
        colony.sync_population_track();
        colony
    }

    /// Rank of the Population attribute, 0 when the colony has none.
    pub fn population_rank(&self) -> i32 {
        self.attributes.rank_of(colony::POPULATION)
    }

    /// Population track length for the current Population rank.
    pub fn population_track_size(&self) -> usize {
        self.population_rank()
            .clamp(0, colony::MAX_POPULATION_BOXES as i32) as usize
    }

    /// Size the population track to the Population rank, keeping the state
    /// of every surviving box.
    pub fn sync_population_track(&mut self) {
        let size = self.population_track_size();
        self.population_track.resize(size, TriStateBox::default);
    }

    /// Change an attribute rank and resync the population track.
    pub fn set_attribute_rank(&mut self, index: usize, rank: i32) -> Result<(), RatedListError> {
        self.attributes.set_rank(index, rank, RANK_BOUNDS)?;
        self.sync_population_track();
        Ok(())
    }

    /// Cycle a population box: empty → committed → expended → empty.
    pub fn cycle_population_box(&mut self, index: usize) -> bool {
        self.population_track.toggle(index)
    }

    pub fn derive(&self, settings: &CampaignSettings) -> ColonyDerived {
        let mut validation = validate_pyramid(
            &self.attributes.items,
            colony::MAX_RANK,
            settings.expected_colony_total(),
            &PyramidPolicy::colony_attributes(),
        );

        let population_rank = self.population_rank();
        let max_population_rank = settings.max_population_rank();
        if self.attributes.find(colony::POPULATION).is_some() && population_rank > max_population_rank {
            validation.warnings.push(PyramidViolation::PopulationTooHigh {
                rank: population_rank,
                max_rank: max_population_rank,
                generation: settings.generation_number,
            });
        }

        // Stored tracks may predate the current rank or carry no `max`.
        let track = self
            .population_track
            .clone()
            .resized(self.population_track_size(), TriStateBox::default);
        let population = aggregate_capacity(&[population_pool(&track, true)]);
        log::debug!(
            "colony: population {}/{}, {} warning(s)",
            population.value(),
            population.capacity,
            validation.warnings.len()
        );

        ColonyDerived {
            validation,
            population_rank,
            max_population_rank,
            population,
        }
    }
}
