//! FarStar Headless Rules Harness
//!
//! Validates the rules engine against sample sheet snapshots.
//! Runs entirely in-process — no host, no rendering, no persistence.
//!
//! Usage:
//!   cargo run -p farstar-simtest
//!   cargo run -p farstar-simtest -- --verbose
//!   RUST_LOG=farstar_logic=debug cargo run -p farstar-simtest

use farstar_logic::age::{AgePosition, AgeTrack, AgeTrackError, AgeTrackKind};
use farstar_logic::capacity::{aggregate_capacity, growing_pool, PoolContribution};
use farstar_logic::colony::Colony;
use farstar_logic::dice::{self, ColorBand, FateDie};
use farstar_logic::extra::{Extra, ExtraKind};
use farstar_logic::npc::NamedNpc;
use farstar_logic::pyramid::{validate_pyramid, PyramidPolicy, RatedItem};
use farstar_logic::scion::FactionScion;
use farstar_logic::settings::{self, CampaignSettings};
use farstar_logic::threat::Threat;
use farstar_logic::track::{resize_track, StressBox, Track};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ── Sample snapshots (same JSON shape the host stores) ──────────────────
const CAMPAIGN_JSON: &str = include_str!("../../../data/campaign.json");
const THREAT_JSON: &str = include_str!("../../../data/threat.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Campaign {
    settings: CampaignSettings,
    colony: Colony,
    faction_scion: FactionScion,
    npcs: Vec<NamedNpc>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== FarStar Rules Harness ===\n");

    let mut results = Vec::new();

    // 1. Campaign settings
    results.extend(validate_settings(verbose));

    // 2. Pyramid and column rules
    results.extend(validate_pyramids(verbose));

    // 3. Track resizing
    results.extend(validate_tracks(verbose));

    // 4. Age track transitions
    results.extend(validate_age_tracks(verbose));

    // 5. Campaign sheets from snapshot
    results.extend(validate_campaign_sheets(verbose));

    // 6. Threat trauma from snapshot
    results.extend(validate_threat(verbose));

    // 7. Extras
    results.extend(validate_extras(verbose));

    // 8. Dice
    results.extend(validate_dice(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        tracing::error!(failed, "harness checks failed");
        std::process::exit(1);
    }
}

fn load_campaign() -> Result<Campaign, String> {
    serde_json::from_str(CAMPAIGN_JSON).map_err(|e| format!("campaign.json: {}", e))
}

fn parse_failure(name: &str, error: String) -> Vec<TestResult> {
    vec![TestResult {
        name: name.into(),
        passed: false,
        detail: format!("JSON parse error: {}", error),
    }]
}

// ── 1. Settings ─────────────────────────────────────────────────────────

fn validate_settings(verbose: bool) -> Vec<TestResult> {
    println!("--- Campaign Settings ---");
    let mut results = Vec::new();

    let campaign = match load_campaign() {
        Ok(c) => c,
        Err(e) => return parse_failure("settings_parse", e),
    };
    let s = &campaign.settings;

    let errors = settings::validate_settings(s);
    results.push(TestResult {
        name: "settings_sample_valid".into(),
        passed: errors.is_empty(),
        detail: format!("{} error(s) in sample settings", errors.len()),
    });

    results.push(TestResult {
        name: "settings_derived_caps".into(),
        passed: s.max_capability() == 4
            && s.expected_colony_total() == 10
            && s.max_population_rank() == 3,
        detail: format!(
            "max capability {}, colony total {}, population cap {}",
            s.max_capability(),
            s.expected_colony_total(),
            s.max_population_rank()
        ),
    });

    let broken = CampaignSettings {
        generation_number: 0,
        significant_milestones: -3,
        major_milestones: 500,
        max_skill: 0,
        base_max_capability: 11,
        debug_mode: true,
    };
    let errors = settings::validate_settings(&broken);
    results.push(TestResult {
        name: "settings_every_error_reported".into(),
        passed: errors.len() == 5,
        detail: format!("{} of 5 bad fields reported", errors.len()),
    });

    results.push(TestResult {
        name: "settings_refresh_floor".into(),
        passed: settings::refresh(0, 12) == 1 && settings::refresh(2, 4) == 4,
        detail: format!(
            "refresh(0, 12)={} refresh(2, 4)={}",
            settings::refresh(0, 12),
            settings::refresh(2, 4)
        ),
    });

    if verbose {
        for error in &errors {
            println!("    {}", error);
        }
    }

    results
}

// ── 2. Pyramids ─────────────────────────────────────────────────────────

fn rated(ranks: &[i32]) -> Vec<RatedItem> {
    ranks
        .iter()
        .enumerate()
        .map(|(i, &rank)| RatedItem::new(format!("entry{}", i), rank))
        .collect()
}

fn validate_pyramids(verbose: bool) -> Vec<TestResult> {
    println!("--- Pyramid & Column Rules ---");
    let mut results = Vec::new();

    let classic = validate_pyramid(
        &rated(&[4, 3, 3, 2, 2, 2, 1, 1, 1, 1]),
        4,
        0,
        &PyramidPolicy::skills(),
    );
    results.push(TestResult {
        name: "pyramid_classic_valid".into(),
        passed: classic.valid && classic.errors.is_empty(),
        detail: format!("{} error(s)", classic.errors.len()),
    });

    let wide_base = validate_pyramid(
        &rated(&[4, 3, 2, 1, 1, 0]),
        4,
        0,
        &PyramidPolicy::colony_attributes(),
    );
    results.push(TestResult {
        name: "pyramid_wide_base_valid".into(),
        passed: wide_base.valid,
        detail: format!("[4,3,2,1,1,0] errors: {:?}", wide_base.messages()),
    });

    let top_heavy = validate_pyramid(&rated(&[3, 2, 2, 1]), 4, 0, &PyramidPolicy::skills());
    let messages = top_heavy.messages();
    results.push(TestResult {
        name: "pyramid_violation_exact_counts".into(),
        passed: !top_heavy.valid
            && messages == vec!["2 skills at +2 but only 1 at +1".to_string()]
            && top_heavy.invalid_ranks.contains(&2),
        detail: format!("{:?}", messages),
    });

    let gap = validate_pyramid(
        &rated(&[3, 1, 1]),
        6,
        7,
        &PyramidPolicy::colony_attributes(),
    );
    results.push(TestResult {
        name: "column_gap_flagged".into(),
        passed: !gap.valid && gap.warnings.len() == 1,
        detail: format!("errors {:?}, {} warning(s)", gap.messages(), gap.warnings.len()),
    });

    let same_shape_as_pyramid =
        validate_pyramid(&rated(&[3, 1, 1]), 6, 0, &PyramidPolicy::skills());
    results.push(TestResult {
        name: "pyramid_skips_empty_ratings".into(),
        passed: same_shape_as_pyramid.valid,
        detail: "[3,1,1] passes the pyramid rule, fails the column rule".into(),
    });

    if verbose {
        for (rank, count) in classic.counts_by_rank.iter().rev() {
            println!("    +{}: {}", rank, count);
        }
    }

    results
}

// ── 3. Tracks ───────────────────────────────────────────────────────────

fn stress(pattern: &[bool]) -> Track<StressBox> {
    Track {
        boxes: pattern.iter().map(|&checked| StressBox { checked }).collect(),
        max: pattern.len(),
    }
}

fn pattern(track: &Track<StressBox>) -> Vec<bool> {
    track.boxes.iter().map(|b| b.checked).collect()
}

fn validate_tracks(_verbose: bool) -> Vec<TestResult> {
    println!("--- Track Resizing ---");
    let mut results = Vec::new();

    let grown = resize_track(stress(&[true, false, true]), 5, StressBox::default);
    results.push(TestResult {
        name: "track_grow_preserves_states".into(),
        passed: pattern(&grown) == vec![true, false, true, false, false],
        detail: format!("{:?}", pattern(&grown)),
    });

    let pool = aggregate_capacity(&[growing_pool(&grown, true)]);
    results.push(TestResult {
        name: "track_growing_capacity".into(),
        passed: pool.capacity == 15 && pool.used == 4,
        detail: format!("capacity {} used {}", pool.capacity, pool.used),
    });

    let again = resize_track(grown.clone(), 5, StressBox::checked);
    results.push(TestResult {
        name: "track_resize_idempotent".into(),
        passed: again == grown,
        detail: "same size leaves the track unchanged".into(),
    });

    let regrown = resize_track(
        resize_track(stress(&[true, true, true]), 1, StressBox::default),
        3,
        StressBox::default,
    );
    results.push(TestResult {
        name: "track_no_resurrection".into(),
        passed: pattern(&regrown) == vec![true, false, false],
        detail: format!("{:?}", pattern(&regrown)),
    });

    results
}

// ── 4. Age Tracks ───────────────────────────────────────────────────────

fn validate_age_tracks(_verbose: bool) -> Vec<TestResult> {
    println!("--- Age Track Transitions ---");
    let mut results = Vec::new();

    let mut track = AgeTrack::new(AgeTrackKind::Scion);
    let before = track.clone();
    let rejected = track.set_passed(2, true);
    results.push(TestResult {
        name: "age_pass_out_of_order_rejected".into(),
        passed: matches!(rejected, Err(AgeTrackError::OrderViolation { .. })) && track == before,
        detail: match &rejected {
            Err(e) => e.to_string(),
            Ok(()) => "accepted".into(),
        },
    });

    results.push(TestResult {
        name: "age_first_pass_accepted".into(),
        passed: track.set_passed(0, true).is_ok() && track.current_stage() == Some(1),
        detail: format!("current stage {:?}", track.current_stage_label()),
    });

    let mut scars = AgeTrack::new(AgeTrackKind::Scion);
    let second_oldest = scars.set_scar(3, true).is_err();
    let oldest = scars.set_scar(4, true).is_ok();
    let then_second = scars.set_scar(3, true).is_ok();
    results.push(TestResult {
        name: "age_scars_from_oldest".into(),
        passed: second_oldest && oldest && then_second,
        detail: format!(
            "second-oldest first rejected={} oldest={} then second={}",
            second_oldest, oldest, then_second
        ),
    });

    let mut wounds = AgeTrack::new(AgeTrackKind::Scion);
    let cleared = wounds.set_wound(1, true).is_ok()
        && wounds.set_free_invoke_used(1, true).is_ok()
        && wounds.set_wound(1, false).is_ok();
    results.push(TestResult {
        name: "age_wound_clears_invoke".into(),
        passed: cleared && !wounds.stages[1].free_invoke_used,
        detail: "clearing a wound clears its free invoke".into(),
    });

    let npc_track = AgeTrack::new(AgeTrackKind::Npc);
    let scion_track = AgeTrack::new(AgeTrackKind::Scion);
    results.push(TestResult {
        name: "age_generational_npc_only".into(),
        passed: npc_track.npc_age(1, 3).is_ok()
            && scion_track.npc_age(1, 3) == Err(AgeTrackError::NotNpcTrack),
        detail: "npc_age refuses Scion tracks".into(),
    });

    results
}

// ── 5. Campaign Sheets ──────────────────────────────────────────────────

fn validate_campaign_sheets(verbose: bool) -> Vec<TestResult> {
    println!("--- Campaign Sheets ---");
    let mut results = Vec::new();

    let mut campaign = match load_campaign() {
        Ok(c) => c,
        Err(e) => return parse_failure("campaign_parse", e),
    };
    let s = campaign.settings.clone();

    // Colony: the stored track has no `max`, derive sizes it from the rank.
    let colony = campaign.colony.derive(&s);
    results.push(TestResult {
        name: "colony_column_valid".into(),
        passed: colony.validation.valid && colony.validation.warnings.is_empty(),
        detail: format!(
            "total {}/{}, {} error(s), {} warning(s)",
            colony.validation.total_points,
            colony.validation.expected_total,
            colony.validation.errors.len(),
            colony.validation.warnings.len()
        ),
    });
    results.push(TestResult {
        name: "colony_population_pool".into(),
        passed: colony.population.capacity == 6 && colony.population.used == 1,
        detail: format!(
            "population {}/{}",
            colony.population.value(),
            colony.population.capacity
        ),
    });
    campaign.colony.sync_population_track();
    let written = serde_json::to_value(&campaign.colony).unwrap_or_default();
    let values: Vec<i64> = written["populationTrack"]["boxes"]
        .as_array()
        .map(|boxes| boxes.iter().filter_map(|b| b["value"].as_i64()).collect())
        .unwrap_or_default();
    results.push(TestResult {
        name: "colony_writes_box_values".into(),
        passed: values == [1, 2, 3],
        detail: format!("box values {:?}", values),
    });
    let locked = campaign.colony.set_attribute_rank(0, 1).is_err();
    results.push(TestResult {
        name: "colony_locked_population".into(),
        passed: locked && campaign.colony.population_track.len() == 3,
        detail: "locked Population refuses rank edits".into(),
    });

    // Faction-Scion
    let sheet = &mut campaign.faction_scion;
    sheet.sync_tracks();
    let derived = sheet.derive(&s);
    results.push(TestResult {
        name: "scion_pyramids_valid".into(),
        passed: derived.skill_validation.valid && derived.capability_validation.valid,
        detail: format!(
            "skills {:?}, capabilities {:?}",
            derived.skill_validation.messages(),
            derived.capability_validation.messages()
        ),
    });
    results.push(TestResult {
        name: "scion_totals".into(),
        passed: derived.total_skill_points == 20 && derived.total_capability_points == 10,
        detail: format!(
            "skills {} capabilities {}",
            derived.total_skill_points, derived.total_capability_points
        ),
    });
    results.push(TestResult {
        name: "scion_refresh".into(),
        passed: derived.stunt_count == 4 && derived.refresh == 3,
        detail: format!("{} stunts → refresh {}", derived.stunt_count, derived.refresh),
    });
    results.push(TestResult {
        name: "scion_age_and_tracks".into(),
        passed: derived.ages_passed == 1
            && derived.current_age_stage.as_deref() == Some("Seasoned")
            && derived.stress.capacity == 3
            && derived.people.capacity == 3,
        detail: format!(
            "ages passed {}, stage {:?}, stress {}/{}, people {}/{}",
            derived.ages_passed,
            derived.current_age_stage,
            derived.stress.value(),
            derived.stress.capacity,
            derived.people.value(),
            derived.people.capacity
        ),
    });

    // Named NPCs
    let expected = [
        ("Matron Vel", AgePosition::Stage(4), false),
        ("Engineer Tam", AgePosition::Stage(3), false),
        ("Old Harrow", AgePosition::Stage(5), true),
    ];
    for (npc, (name, position, deceased)) in campaign.npcs.iter().zip(expected) {
        let age = npc.age(&s);
        let ok = matches!(&age, Ok(a) if a.position == position && a.is_deceased == deceased);
        results.push(TestResult {
            name: format!("npc_age_{}", name.to_lowercase().replace(' ', "_")),
            passed: npc.name == name && ok,
            detail: format!("{:?}", age),
        });
    }

    let mut rng = StdRng::seed_from_u64(11);
    let rolls: Vec<_> = campaign
        .npcs
        .iter()
        .map(|npc| npc.roll_skill(&mut rng))
        .collect();
    let skilled_ok = matches!(&rolls[..], [Some(r), None, None] if r.modifier == 2 && r.final_result == r.total + 2);
    results.push(TestResult {
        name: "npc_skill_roll".into(),
        passed: skilled_ok,
        detail: format!(
            "{:?}",
            rolls.iter().map(|r| r.as_ref().map(|o| o.summary())).collect::<Vec<_>>()
        ),
    });

    if verbose {
        for npc in &campaign.npcs {
            if let Ok(d) = npc.derive(&s) {
                println!(
                    "    {}: {} (deceased={}, death {:?})",
                    npc.name, d.current_age_label, d.age.is_deceased, d.age.death_generation
                );
            }
        }
    }

    results
}

// ── 6. Threat ───────────────────────────────────────────────────────────

fn validate_threat(verbose: bool) -> Vec<TestResult> {
    println!("--- Threat Trauma ---");
    let mut results = Vec::new();

    let mut threat: Threat = match serde_json::from_str(THREAT_JSON) {
        Ok(t) => t,
        Err(e) => return parse_failure("threat_parse", e.to_string()),
    };
    threat.prepare();
    let sections = &threat.modular_sections;

    results.push(TestResult {
        name: "threat_columns_padded".into(),
        passed: sections.capabilities_column.skills.len() == 8
            && sections.skills_column.skills.len() == 8
            && sections.capabilities_column.shown().len() == 3,
        detail: format!(
            "{} / {} slots",
            sections.capabilities_column.skills.len(),
            sections.skills_column.skills.len()
        ),
    });
    results.push(TestResult {
        name: "threat_tracks_sized".into(),
        passed: sections.growing_stress.track1.track.boxes.len() == 4
            && sections.ladder2.rungs.boxes.len() == 2
            && sections.ladder1.rungs.boxes.len() == 6,
        detail: "stress matches max, ladders padded, hidden rungs kept".into(),
    });

    let derived = threat.derive();
    results.push(TestResult {
        name: "threat_trauma_totals".into(),
        passed: derived.trauma.capacity == 37 && derived.trauma.used == 8,
        detail: format!(
            "trauma {}/{}",
            derived.trauma.value(),
            derived.trauma.capacity
        ),
    });
    results.push(TestResult {
        name: "threat_current_age".into(),
        passed: derived.current_age_stage.as_deref() == Some("Seasoned"),
        detail: format!("{:?}", derived.current_age_stage),
    });

    let overwhelmed = aggregate_capacity(&[
        PoolContribution::new(derived.trauma.capacity, derived.trauma.used),
        PoolContribution::new(0, 40),
    ]);
    results.push(TestResult {
        name: "threat_trauma_unclamped".into(),
        passed: overwhelmed.value() < 0,
        detail: format!("over-committed value {}", overwhelmed.value()),
    });

    let mut hidden = threat.clone();
    hidden.modular_sections.consequences.visible = false;
    hidden.modular_sections.age_track.visible = false;
    let hidden_trauma = hidden.derive().trauma;
    results.push(TestResult {
        name: "threat_hidden_sections_zero".into(),
        passed: hidden_trauma.capacity == 37 - 12 - 4 && hidden_trauma.used == 8 - 2 - 1,
        detail: format!("{:?}", hidden_trauma),
    });

    if verbose {
        for (i, pool) in threat.trauma_pools().iter().enumerate() {
            println!(
                "    pool {}: enabled={} {}/{}",
                i, pool.enabled, pool.used, pool.capacity
            );
        }
    }

    results
}

// ── 7. Extras ───────────────────────────────────────────────────────────

fn validate_extras(_verbose: bool) -> Vec<TestResult> {
    println!("--- Extras ---");
    let mut results = Vec::new();

    let mut aspect = Extra::new(ExtraKind::Aspect, "Salvaged Reactor");
    for _ in 0..15 {
        aspect.adjust_invokes(1);
    }
    aspect.invokes.toggle(0);
    results.push(TestResult {
        name: "extra_invokes_bounded".into(),
        passed: aspect.invokes.len() == 10 && aspect.available_invokes() == 9,
        detail: format!(
            "{} boxes, {} available",
            aspect.invokes.len(),
            aspect.available_invokes()
        ),
    });

    let mut ladder = Extra::new(ExtraKind::Ladder, "Alert Level");
    ladder.adjust_rung_count(-10);
    let min = ladder.rungs.len();
    ladder.adjust_rung_count(20);
    results.push(TestResult {
        name: "extra_ladder_bounded".into(),
        passed: min == 1 && ladder.rungs.len() == 10,
        detail: format!("min {} max {}", min, ladder.rungs.len()),
    });

    let mut track = Extra::new(ExtraKind::GrowingTrack, "Fuel");
    track.adjust_track_length(3);
    track.boxes.toggle(3);
    let capacity = track.track_capacity();
    results.push(TestResult {
        name: "extra_growing_track".into(),
        passed: capacity.map(|c| (c.capacity, c.used)) == Some((10, 4)),
        detail: format!("{:?}", capacity),
    });

    results
}

// ── 8. Dice ─────────────────────────────────────────────────────────────

fn validate_dice(verbose: bool) -> Vec<TestResult> {
    println!("--- Dice ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(42);
    let rolls = 10_000;
    let mut out_of_range = 0;
    let mut misbanded = 0;
    let mut face_counts = [0u32; 3];
    let mut band_counts = [0u32; 4];
    for _ in 0..rolls {
        let outcome = dice::roll_fate(0, &mut rng);
        if !(-4..=4).contains(&outcome.final_result) {
            out_of_range += 1;
        }
        if outcome.final_result < 1 && outcome.band != ColorBand::Red {
            misbanded += 1;
        }
        for value in outcome.die_results() {
            face_counts[(value + 1) as usize] += 1;
        }
        let band = match outcome.band {
            ColorBand::Red => 0,
            ColorBand::Orange => 1,
            ColorBand::Blue => 2,
            ColorBand::Green => 3,
        };
        band_counts[band] += 1;
    }

    results.push(TestResult {
        name: "dice_final_in_range".into(),
        passed: out_of_range == 0,
        detail: format!("{} of {} rolls outside [-4, 4]", out_of_range, rolls),
    });
    results.push(TestResult {
        name: "dice_red_below_one".into(),
        passed: misbanded == 0,
        detail: format!("{} rolls below 1 not red", misbanded),
    });

    let dice_rolled = (rolls * dice::DICE_PER_ROLL) as f64;
    let uniform = face_counts
        .iter()
        .all(|&n| (n as f64 / dice_rolled - 1.0 / 3.0).abs() < 0.02);
    results.push(TestResult {
        name: "dice_faces_uniform".into(),
        passed: uniform,
        detail: format!("-/0/+ counts {:?}", face_counts),
    });

    let priority = dice::classify(3, -3) == ColorBand::Red
        && dice::classify(2, 1) == ColorBand::Green
        && dice::classify(-2, 4) == ColorBand::Orange
        && dice::classify(0, 1) == ColorBand::Blue;
    results.push(TestResult {
        name: "dice_band_priority".into(),
        passed: priority,
        detail: "red beats green; other bands read the dice total".into(),
    });

    let fixed = dice::evaluate(
        [FateDie::Plus, FateDie::Plus, FateDie::Blank, FateDie::Minus],
        2,
    );
    results.push(TestResult {
        name: "dice_summary_line".into(),
        passed: fixed.summary() == "+ + 0 - | 1 +2 = 3",
        detail: fixed.summary(),
    });

    if verbose {
        println!(
            "  Bands over {} rolls: red {} orange {} blue {} green {}",
            rolls, band_counts[0], band_counts[1], band_counts[2], band_counts[3]
        );
    }

    results
}
