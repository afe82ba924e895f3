//! Integration tests for the sheet derivation pipeline.
//!
//! Exercises: CampaignSettings → rated lists → tracks → age tracks
//! → trauma pools → dice
//!
//! All tests are pure logic — no host, no rendering.

use farstar_logic::age::{AgeTrack, AgeTrackError, AgeTrackKind};
use farstar_logic::capacity::{aggregate_capacity, growing_pool, CapacityPool};
use farstar_logic::colony::Colony;
use farstar_logic::dice::{roll_fate, ColorBand};
use farstar_logic::npc::NamedNpc;
use farstar_logic::pyramid::{validate_pyramid, PyramidPolicy, RatedItem, RatedList};
use farstar_logic::scion::{FactionScion, Stunt};
use farstar_logic::settings::{validate_settings, CampaignSettings};
use farstar_logic::threat::Threat;
use farstar_logic::track::{resize_track, StressBox, Track};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

fn settings(generation: i32) -> CampaignSettings {
    CampaignSettings {
        generation_number: generation,
        significant_milestones: 2,
        major_milestones: 1,
        ..CampaignSettings::default()
    }
}

fn rated(entries: &[(&str, i32)]) -> RatedList {
    RatedList::new(
        entries
            .iter()
            .map(|&(name, rank)| RatedItem::new(name, rank))
            .collect(),
    )
}

fn items(ranks: &[i32]) -> Vec<RatedItem> {
    ranks
        .iter()
        .enumerate()
        .map(|(i, &rank)| RatedItem::new(format!("attr{i}"), rank))
        .collect()
}

// ── Pyramid scenarios ──────────────────────────────────────────────────

#[test]
fn wide_base_list_is_a_valid_pyramid() {
    // count(1)=2 ≥ count(2)=1, so rank +1 is not top-heavy.
    let result = validate_pyramid(
        &items(&[4, 3, 2, 1, 1, 0]),
        4,
        0,
        &PyramidPolicy::colony_attributes(),
    );
    assert!(result.valid, "{:?}", result.messages());
    assert_eq!(result.count_at(1), 2);
    assert_eq!(result.count_at(0), 1);
}

#[test]
fn top_heavy_rank_named_exactly() {
    let result = validate_pyramid(
        &items(&[4, 3, 2, 2, 1]),
        4,
        0,
        &PyramidPolicy::colony_attributes(),
    );
    assert!(!result.valid);
    assert_eq!(
        result.messages(),
        vec!["2 attribute(s) at +2 but only 1 at +1".to_string()]
    );
}

// ── Track scenarios ────────────────────────────────────────────────────

#[test]
fn growing_stress_resize_recomputes_capacity() {
    let track = Track {
        boxes: vec![
            StressBox { checked: true },
            StressBox { checked: false },
            StressBox { checked: true },
        ],
        max: 3,
    };
    let track = resize_track(track, 5, StressBox::default);
    let checked: Vec<bool> = track.boxes.iter().map(|b| b.checked).collect();
    assert_eq!(checked, vec![true, false, true, false, false]);

    let pool = aggregate_capacity(&[growing_pool(&track, true)]);
    assert_eq!(pool, CapacityPool { capacity: 15, used: 4 });
}

// ── Age scenarios ──────────────────────────────────────────────────────

#[test]
fn scion_lives_through_every_stage_in_order() {
    let mut track = AgeTrack::new(AgeTrackKind::Scion);
    for i in 0..track.len() {
        assert!(matches!(
            track.set_passed(i + 1, true),
            Err(AgeTrackError::OrderViolation { .. }) | Err(AgeTrackError::StageOutOfRange { .. })
        ));
        track.set_passed(i, true).unwrap();
    }
    assert_eq!(track.current_stage(), None);
    assert_eq!(track.passed_count(), 5);

    // Unwind newest first.
    for i in (0..track.len()).rev() {
        track.set_passed(i, false).unwrap();
    }
    assert_eq!(track.current_stage(), Some(0));
}

#[test]
fn npc_death_follows_generations_and_scars() {
    let mut npc = NamedNpc::new("Archivist Sol", 1);
    let campaign = settings(4);
    assert!(!npc.age(&campaign).unwrap().is_deceased);

    // Scar ancient, geriatric, older: max reachable drops to seasoned (2).
    npc.toggle_scar(5).unwrap();
    npc.toggle_scar(4).unwrap();
    npc.toggle_scar(3).unwrap();
    let age = npc.age(&campaign).unwrap();
    assert!(age.is_deceased);
    assert_eq!(age.death_generation, Some(1 + 2 + 1));
}

// ── Sheet pipelines ────────────────────────────────────────────────────

#[test]
fn faction_scion_pipeline() {
    let campaign = settings(3);
    assert!(validate_settings(&campaign).is_empty());

    let mut sheet = FactionScion::default();
    sheet.scion.skills = rated(&[
        ("Pilot", 4),
        ("Notice", 3),
        ("Will", 3),
        ("Fight", 2),
        ("Craft", 2),
        ("Lore", 2),
        ("Stealth", 1),
        ("Rapport", 1),
        ("Athletics", 1),
        ("Empathy", 1),
    ]);
    sheet.faction.capabilities = rated(&[("People", 4), ("Wealth", 2), ("Reach", 2), ("Tech", 1), ("Might", 1), ("Lore", 1)]);
    sheet.faction.stunts = (0..5)
        .map(|i| Stunt {
            name: format!("Stunt {i}"),
            ..Stunt::default()
        })
        .collect();
    sheet.scion.stress.max = 4;
    sheet.sync_tracks();

    let derived = sheet.derive(&campaign);
    assert!(derived.skill_validation.valid);
    // max capability is 3 + 1 major milestone.
    assert!(derived.capability_validation.valid, "{:?}", derived.capability_validation.messages());
    assert_eq!(derived.refresh, 3 + 2 - 2);
    assert_eq!(derived.people.capacity, 1 + 2 + 3 + 4);
    assert_eq!(derived.stress.capacity, 4);
}

#[test]
fn colony_pipeline_warns_without_failing() {
    let mut colony = Colony::new(rated(&[("Population", 3), ("Industry", 2), ("Science", 1), ("Trade", 1)]));
    colony.cycle_population_box(2);
    colony.cycle_population_box(2);

    let derived = colony.derive(&settings(2));
    assert!(derived.validation.valid);
    // Total 7 vs 8, and Population +3 over the +2 cap.
    assert_eq!(derived.validation.warnings.len(), 2);
    assert_eq!(derived.population.capacity, 6);
    assert_eq!(derived.population.used, 3);
}

#[test]
fn threat_snapshot_round_trip_keeps_trauma() {
    let mut threat = Threat::default();
    let s = &mut threat.modular_sections;
    s.growing_stress.visible = true;
    s.growing_stress.track1.track = Track::filled(5, StressBox::default);
    s.growing_stress.track1.track.boxes[4].checked = true;
    s.growing_stress.track2.visible = false;
    threat.prepare();
    let before = threat.derive();
    assert_eq!(before.trauma, CapacityPool { capacity: 15, used: 5 });

    let json = serde_json::to_string(&threat).unwrap();
    let restored: Threat = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.derive(), before);
}

// ── Dice ───────────────────────────────────────────────────────────────

#[test]
fn heavy_penalty_is_always_red() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..500 {
        let outcome = roll_fate(-5, &mut rng);
        assert_eq!(outcome.band, ColorBand::Red);
    }
}
