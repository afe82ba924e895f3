//! Pure rules logic for Scions of FarStar.
//!
//! This crate contains all sheet rules that are independent of any host
//! application, renderer or storage. Functions take plain data (a sheet
//! snapshot plus [`settings::CampaignSettings`]) and return derived data,
//! making them unit-testable and reusable from any front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`age`] | Age track state machine, NPC generational aging |
//! | [`capacity`] | Trauma/capacity pools and consequence slots |
//! | [`colony`] | Colony attribute column and population track |
//! | [`constants`] | Age stages, consequence values, rank windows, size bounds |
//! | [`dice`] | 4dF rolls and color banding |
//! | [`extra`] | Extra items: invokes, ladders, skills, tracks |
//! | [`format`] | Signed display of ratings and modifiers |
//! | [`npc`] | Named NPCs aged by generation |
//! | [`pyramid`] | Pyramid/column validation and locked rated lists |
//! | [`scion`] | Faction-Scion sheet: skills, capabilities, refresh |
//! | [`settings`] | Campaign settings and their validation |
//! | [`threat`] | Modular threat sheet and threat trauma |
//! | [`track`] | Resizable box tracks and +/- adjusters |

pub mod age;
pub mod capacity;
pub mod colony;
pub mod constants;
pub mod dice;
pub mod extra;
pub mod format;
pub mod npc;
pub mod pyramid;
pub mod scion;
pub mod settings;
pub mod threat;
pub mod track;
