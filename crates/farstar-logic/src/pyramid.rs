//! Pyramid and column validation for rated lists.
//!
//! Skills, faction capabilities and colony attributes are all lists of
//! named ratings that must form a pyramid: as the rating goes up, the
//! number of entries at that rating may never grow. Results are returned
//! as data ([`PyramidValidation`]); callers decide whether a failure
//! blocks anything or only shows a warning badge.
//!
//! ```
//! use farstar_logic::pyramid::{validate_pyramid, PyramidPolicy, RatedItem};
//!
//! let skills = vec![
//!     RatedItem::new("Fight", 3),
//!     RatedItem::new("Notice", 2),
//!     RatedItem::new("Will", 2),
//!     RatedItem::new("Craft", 1),
//!     RatedItem::new("Lore", 1),
//! ];
//! let result = validate_pyramid(&skills, 4, 9, &PyramidPolicy::skills());
//! assert!(result.valid);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{colony, faction};
use crate::format::Signed;

/// One named rating on a pyramid (skill, capability or attribute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedItem {
    pub name: String,
    /// Clamped by [`RatedItem::set_rank`]. A stored rank loads as-is, and
    /// [`validate_pyramid`] reports it if it lies outside the list's window.
    pub rank: i32,
    /// Locked entries cannot be renamed, moved or removed.
    #[serde(default)]
    pub locked: bool,
}

impl RatedItem {
    pub fn new(name: impl Into<String>, rank: i32) -> Self {
        Self {
            name: name.into(),
            rank,
            locked: false,
        }
    }

    pub fn locked(name: impl Into<String>, rank: i32) -> Self {
        Self {
            locked: true,
            ..Self::new(name, rank)
        }
    }

    /// Set the rank, clamped into `bounds`.
    pub fn set_rank(&mut self, rank: i32, bounds: RankBounds) {
        self.rank = bounds.clamp(rank);
    }
}

/// Inclusive window a rank is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBounds {
    pub min: i32,
    pub max: i32,
}

impl RankBounds {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, rank: i32) -> i32 {
        rank.clamp(self.min, self.max.max(self.min))
    }
}

impl Default for RankBounds {
    fn default() -> Self {
        Self::new(faction::DEFAULT_FLOOR, colony::MAX_RANK)
    }
}

/// How adjacent ranks are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeRule {
    /// Compare each populated rating with the next populated rating below
    /// it; empty ratings in between are skipped.
    Pyramid,
    /// Compare every rating with the one directly below it, so a gap under
    /// a populated rating is itself a violation.
    Column,
}

/// What a total mismatch means to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalPolicy {
    /// Totals are not checked.
    Ignore,
    /// A mismatch is reported under `warnings`; validity is unaffected.
    Warn,
    /// A mismatch is reported under `errors` and invalidates the list.
    Fatal,
}

/// Per call-site knobs for [`validate_pyramid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidPolicy {
    /// Word used for entries in messages ("skills", "attribute(s)").
    pub noun: String,
    pub shape: ShapeRule,
    /// The top populated rating must hold exactly one entry.
    pub require_single_apex: bool,
    /// Count ratings at or below zero towards shape and total.
    pub include_non_positive: bool,
    pub total: TotalPolicy,
    /// Floor for entries without a named floor; `None` skips floor checks.
    pub default_floor: Option<i32>,
    /// Named floors, e.g. the People capability may not go below 0.
    pub floors: BTreeMap<String, i32>,
}

impl PyramidPolicy {
    /// Scion skills: apex of one, no totals, floor -1.
    pub fn skills() -> Self {
        Self {
            noun: "skills".to_string(),
            shape: ShapeRule::Pyramid,
            require_single_apex: true,
            include_non_positive: false,
            total: TotalPolicy::Ignore,
            default_floor: Some(faction::DEFAULT_FLOOR),
            floors: BTreeMap::new(),
        }
    }

    /// Faction capabilities: like skills, but People may not go below 0.
    pub fn capabilities() -> Self {
        let mut floors = BTreeMap::new();
        floors.insert(faction::PEOPLE.to_string(), 0);
        Self {
            noun: "capabilities".to_string(),
            floors,
            ..Self::skills()
        }
    }

    /// Colony attribute column: gaps count, totals only warn.
    pub fn colony_attributes() -> Self {
        Self {
            noun: "attribute(s)".to_string(),
            shape: ShapeRule::Column,
            require_single_apex: false,
            include_non_positive: false,
            total: TotalPolicy::Warn,
            default_floor: Some(colony::MIN_RANK),
            floors: BTreeMap::new(),
        }
    }

    fn floor_for(&self, name: &str) -> Option<i32> {
        self.floors.get(name).copied().or(self.default_floor)
    }
}

/// A single problem found while validating a rated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PyramidViolation {
    /// More entries at a rating than at the rating below it.
    Shape {
        higher: i32,
        higher_count: u32,
        lower: i32,
        lower_count: u32,
        noun: String,
    },
    /// The top rating does not hold exactly one entry.
    Apex { rank: i32, count: u32, noun: String },
    /// An entry is rated above the cap.
    Ceiling { name: String, rating: i32, max: i32 },
    /// An entry is rated below its floor.
    Floor { name: String, rating: i32, floor: i32 },
    TotalTooLow {
        total: i32,
        expected: i32,
        difference: i32,
    },
    TotalTooHigh {
        total: i32,
        expected: i32,
        difference: i32,
    },
    /// Colony Population rated above what the generation allows.
    PopulationTooHigh {
        rank: i32,
        max_rank: i32,
        generation: i32,
    },
}

impl fmt::Display for PyramidViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape {
                higher,
                higher_count,
                lower,
                lower_count,
                noun,
            } => write!(
                f,
                "{higher_count} {noun} at {} but only {lower_count} at {}",
                Signed(*higher),
                Signed(*lower)
            ),
            Self::Apex { rank, count, noun } => write!(
                f,
                "apex at {} should have exactly 1 {noun}, found {count}",
                Signed(*rank)
            ),
            Self::Ceiling { name, rating, max } => {
                write!(f, "{name} rating {rating} exceeds maximum of {max}")
            }
            Self::Floor {
                name,
                rating,
                floor,
            } => write!(f, "{name} rating {rating} is below the floor of {floor}"),
            Self::TotalTooLow {
                total,
                expected,
                difference,
            } => write!(
                f,
                "total of {total} is {difference} too low (expected {expected})"
            ),
            Self::TotalTooHigh {
                total,
                expected,
                difference,
            } => write!(
                f,
                "total of {total} is {difference} too high (expected {expected})"
            ),
            Self::PopulationTooHigh {
                rank,
                max_rank,
                generation,
            } => write!(
                f,
                "Population {} exceeds {} allowed in generation {generation}",
                Signed(*rank),
                Signed(*max_rank)
            ),
        }
    }
}

/// Result of validating a rated list. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidValidation {
    pub valid: bool,
    pub errors: Vec<PyramidViolation>,
    pub warnings: Vec<PyramidViolation>,
    /// Number of entries at each rank, every rank included.
    pub counts_by_rank: BTreeMap<i32, u32>,
    /// Ranks holding more entries than the rank below them.
    pub invalid_ranks: BTreeSet<i32>,
    pub total_points: i32,
    pub expected_total: i32,
}

impl PyramidValidation {
    /// Number of entries at `rank`.
    pub fn count_at(&self, rank: i32) -> u32 {
        self.counts_by_rank.get(&rank).copied().unwrap_or(0)
    }

    /// Error messages, for display.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Compare a point total against the expected total.
pub fn check_total(total: i32, expected: i32) -> Option<PyramidViolation> {
    if total < expected {
        Some(PyramidViolation::TotalTooLow {
            total,
            expected,
            difference: expected - total,
        })
    } else if total > expected {
        Some(PyramidViolation::TotalTooHigh {
            total,
            expected,
            difference: total - expected,
        })
    } else {
        None
    }
}

/// Validate a rated list against pyramid shape, apex, ceiling, floor and
/// total rules. `items` is never modified.
pub fn validate_pyramid(
    items: &[RatedItem],
    max_rating: i32,
    expected_total: i32,
    policy: &PyramidPolicy,
) -> PyramidValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut counts_by_rank: BTreeMap<i32, u32> = BTreeMap::new();
    let mut shape_counts: BTreeMap<i32, u32> = BTreeMap::new();
    let mut total_points = 0;

    for item in items {
        *counts_by_rank.entry(item.rank).or_insert(0) += 1;
        if item.rank > 0 || policy.include_non_positive {
            *shape_counts.entry(item.rank).or_insert(0) += 1;
            total_points += item.rank;
        }

        if item.rank > max_rating {
            errors.push(PyramidViolation::Ceiling {
                name: item.name.clone(),
                rating: item.rank,
                max: max_rating,
            });
        }
        if let Some(floor) = policy.floor_for(&item.name) {
            if item.rank < floor {
                errors.push(PyramidViolation::Floor {
                    name: item.name.clone(),
                    rating: item.rank,
                    floor,
                });
            }
        }
    }

    let mut invalid_ranks = BTreeSet::new();
    for (higher, lower) in adjacent_pairs(&shape_counts, policy) {
        let higher_count = shape_counts.get(&higher).copied().unwrap_or(0);
        let lower_count = shape_counts.get(&lower).copied().unwrap_or(0);
        if higher_count > lower_count {
            invalid_ranks.insert(higher);
            errors.push(PyramidViolation::Shape {
                higher,
                higher_count,
                lower,
                lower_count,
                noun: policy.noun.clone(),
            });
        }
    }

    if policy.require_single_apex {
        if let Some((&rank, &count)) = shape_counts.iter().next_back() {
            if count != 1 {
                errors.push(PyramidViolation::Apex {
                    rank,
                    count,
                    noun: policy.noun.clone(),
                });
            }
        }
    }

    if let Some(mismatch) = check_total(total_points, expected_total) {
        match policy.total {
            TotalPolicy::Ignore => {}
            TotalPolicy::Warn => warnings.push(mismatch),
            TotalPolicy::Fatal => errors.push(mismatch),
        }
    }

    log::debug!(
        "validated {} {}: {} error(s), {} warning(s)",
        items.len(),
        policy.noun,
        errors.len(),
        warnings.len()
    );

    PyramidValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
        counts_by_rank,
        invalid_ranks,
        total_points,
        expected_total,
    }
}

/// (higher, lower) rank pairs to compare, highest first.
fn adjacent_pairs(shape_counts: &BTreeMap<i32, u32>, policy: &PyramidPolicy) -> Vec<(i32, i32)> {
    match policy.shape {
        ShapeRule::Pyramid => {
            let ranks: Vec<i32> = shape_counts.keys().rev().copied().collect();
            ranks.windows(2).map(|pair| (pair[0], pair[1])).collect()
        }
        ShapeRule::Column => {
            let (Some(&bottom), Some(&top)) = (shape_counts.keys().next(), shape_counts.keys().next_back())
            else {
                return Vec::new();
            };
            let bottom = if policy.include_non_positive { bottom } else { 1 };
            ((bottom + 1)..=top).rev().map(|rank| (rank, rank - 1)).collect()
        }
    }
}

/// A rejected edit to a rated list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatedListError {
    #[error("{0} is locked")]
    Locked(String),
    #[error("no entry at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Editable rated list honoring per-entry locks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatedList {
    pub items: Vec<RatedItem>,
}

impl RatedList {
    pub fn new(items: Vec<RatedItem>) -> Self {
        Self { items }
    }

    pub fn find(&self, name: &str) -> Option<&RatedItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Rank of the named entry, or 0 when absent.
    pub fn rank_of(&self, name: &str) -> i32 {
        self.find(name).map_or(0, |item| item.rank)
    }

    /// Sum of every entry's rank.
    pub fn total_points(&self) -> i32 {
        self.items.iter().map(|item| item.rank).sum()
    }

    /// Append an unlocked entry at rank 0 and return its index.
    pub fn add(&mut self, name: impl Into<String>) -> usize {
        self.items.push(RatedItem::new(name, 0));
        self.items.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<RatedItem, RatedListError> {
        self.unlocked(index)?;
        Ok(self.items.remove(index))
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), RatedListError> {
        self.unlocked(index)?.name = name.into();
        Ok(())
    }

    /// Move an entry to a new rank (clamped into `bounds`).
    pub fn set_rank(
        &mut self,
        index: usize,
        rank: i32,
        bounds: RankBounds,
    ) -> Result<(), RatedListError> {
        self.unlocked(index)?.set_rank(rank, bounds);
        Ok(())
    }

    fn unlocked(&mut self, index: usize) -> Result<&mut RatedItem, RatedListError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(RatedListError::IndexOutOfRange { index, len })?;
        if item.locked {
            log::warn!("rejected edit to locked entry {}", item.name);
            return Err(RatedListError::Locked(item.name.clone()));
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(ranks: &[i32]) -> Vec<RatedItem> {
        ranks
            .iter()
            .enumerate()
            .map(|(i, &rank)| RatedItem::new(format!("item{i}"), rank))
            .collect()
    }

    fn lenient() -> PyramidPolicy {
        PyramidPolicy {
            total: TotalPolicy::Ignore,
            ..PyramidPolicy::skills()
        }
    }

    #[test]
    fn classic_pyramid_is_valid() {
        let result = validate_pyramid(&items(&[4, 3, 3, 2, 2, 2, 1, 1, 1, 1]), 4, 20, &lenient());
        assert!(result.valid, "{:?}", result.messages());
        assert!(result.errors.is_empty());
        assert_eq!(result.count_at(2), 3);
        assert_eq!(result.total_points, 20);
    }

    #[test]
    fn shape_violation_names_exact_counts() {
        let result = validate_pyramid(&items(&[3, 2, 2, 1]), 4, 0, &lenient());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].to_string(), "2 skills at +2 but only 1 at +1");
        assert!(result.invalid_ranks.contains(&2));
    }

    #[test]
    fn descending_ranks_with_wide_base_is_valid() {
        // Two entries at +1 under one at +2 is the normal pyramid shape.
        let policy = PyramidPolicy {
            noun: "attribute(s)".into(),
            ..lenient()
        };
        let result = validate_pyramid(&items(&[4, 3, 2, 1, 1, 0]), 4, 0, &policy);
        assert!(result.valid, "{:?}", result.messages());
        assert_eq!(result.count_at(0), 1);
    }

    #[test]
    fn pyramid_rule_skips_empty_ratings() {
        // +3 and +1 populated, +2 empty: compared with each other directly.
        let result = validate_pyramid(&items(&[3, 1, 1]), 4, 0, &lenient());
        assert!(result.valid, "{:?}", result.messages());
    }

    #[test]
    fn column_rule_flags_gaps() {
        let policy = PyramidPolicy {
            total: TotalPolicy::Ignore,
            ..PyramidPolicy::colony_attributes()
        };
        let result = validate_pyramid(&items(&[3, 1, 1]), 6, 0, &policy);
        assert!(!result.valid);
        assert_eq!(
            result.errors[0].to_string(),
            "1 attribute(s) at +3 but only 0 at +2"
        );
    }

    #[test]
    fn apex_must_be_single() {
        let result = validate_pyramid(&items(&[3, 3, 2, 2, 1, 1]), 4, 0, &lenient());
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![PyramidViolation::Apex {
                rank: 3,
                count: 2,
                noun: "skills".into()
            }]
        );
    }

    #[test]
    fn ceiling_reported_per_item() {
        let result = validate_pyramid(&items(&[5, 5, 4, 4, 4]), 4, 0, &lenient());
        let ceilings = result
            .errors
            .iter()
            .filter(|e| matches!(e, PyramidViolation::Ceiling { .. }))
            .count();
        assert_eq!(ceilings, 2);
    }

    #[test]
    fn stored_ranks_outside_window_are_reported() {
        let list: RatedList = serde_json::from_str(
            r#"[{ "name": "Industry", "rank": 9 },
                { "name": "Science", "rank": 1 },
                { "name": "Trade", "rank": -2 }]"#,
        )
        .unwrap();
        assert_eq!(list.items[0].rank, 9);

        let result = validate_pyramid(
            &list.items,
            colony::MAX_RANK,
            0,
            &PyramidPolicy::colony_attributes(),
        );
        assert!(!result.valid);
        assert!(result.errors.contains(&PyramidViolation::Ceiling {
            name: "Industry".into(),
            rating: 9,
            max: colony::MAX_RANK,
        }));
        assert!(result.errors.contains(&PyramidViolation::Floor {
            name: "Trade".into(),
            rating: -2,
            floor: colony::MIN_RANK,
        }));
    }

    #[test]
    fn people_capability_floor_is_zero() {
        let caps = vec![
            RatedItem::new("Military", 2),
            RatedItem::new("Culture", 1),
            RatedItem::new("Industrial", 1),
            RatedItem::new("Technology", -1),
            RatedItem::new("People", -1),
        ];
        let result = validate_pyramid(&caps, 3, 0, &PyramidPolicy::capabilities());
        assert_eq!(
            result.errors,
            vec![PyramidViolation::Floor {
                name: "People".into(),
                rating: -1,
                floor: 0
            }]
        );
    }

    #[test]
    fn totals_warn_or_fail_by_policy() {
        let list = items(&[2, 1, 1]);
        let warn = PyramidPolicy {
            total: TotalPolicy::Warn,
            ..PyramidPolicy::skills()
        };
        let result = validate_pyramid(&list, 4, 7, &warn);
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![PyramidViolation::TotalTooLow {
                total: 4,
                expected: 7,
                difference: 3
            }]
        );

        let fatal = PyramidPolicy {
            total: TotalPolicy::Fatal,
            ..warn
        };
        let result = validate_pyramid(&list, 4, 2, &fatal);
        assert!(!result.valid);
        assert_eq!(
            result.errors[0].to_string(),
            "total of 4 is 2 too high (expected 2)"
        );
    }

    #[test]
    fn non_positive_ratings_ignored_by_default() {
        let result = validate_pyramid(&items(&[1, 0, 0, -1]), 4, 1, &lenient());
        assert!(result.valid);
        assert_eq!(result.total_points, 1);
        assert_eq!(result.count_at(-1), 1);
    }

    #[test]
    fn input_is_untouched() {
        let list = items(&[5, 3]);
        let before = list.clone();
        let _ = validate_pyramid(&list, 4, 0, &lenient());
        assert_eq!(list, before);
    }

    #[test]
    fn empty_list_is_valid() {
        let result = validate_pyramid(&[], 4, 0, &lenient());
        assert!(result.valid);
        assert!(result.counts_by_rank.is_empty());
    }

    #[test]
    fn check_total_directions() {
        assert_eq!(check_total(5, 5), None);
        assert!(matches!(
            check_total(3, 5),
            Some(PyramidViolation::TotalTooLow { difference: 2, .. })
        ));
        assert!(matches!(
            check_total(8, 5),
            Some(PyramidViolation::TotalTooHigh { difference: 3, .. })
        ));
    }

    #[test]
    fn set_rank_clamps() {
        let mut item = RatedItem::new("Fight", 0);
        item.set_rank(9, RankBounds::default());
        assert_eq!(item.rank, 6);
        item.set_rank(-4, RankBounds::default());
        assert_eq!(item.rank, -1);
    }

    #[test]
    fn locked_entries_refuse_edits() {
        let mut list = RatedList::new(vec![
            RatedItem::locked("Population", 1),
            RatedItem::new("Culture", 2),
        ]);
        assert_eq!(
            list.remove(0),
            Err(RatedListError::Locked("Population".into()))
        );
        assert!(list.rename(0, "Pop").is_err());
        assert!(list.set_rank(0, 3, RankBounds::new(0, 6)).is_err());

        list.rename(1, "Art").unwrap();
        list.set_rank(1, 9, RankBounds::new(0, 6)).unwrap();
        assert_eq!(list.items[1].rank, 6);

        let idx = list.add("Trade");
        assert_eq!(list.items[idx].rank, 0);
        assert_eq!(list.remove(idx).unwrap().name, "Trade");
        assert_eq!(
            list.remove(7),
            Err(RatedListError::IndexOutOfRange { index: 7, len: 2 })
        );
        assert_eq!(list.rank_of("Population"), 1);
        assert_eq!(list.rank_of("Missing"), 0);
    }
}
