//! Rule constants — age stages, consequence values, rank windows, size limits.
//!
//! Plain values with no host dependency. The sheet modules and the
//! simtest harness both read these.

/// Age stage keys and labels, youngest first.
pub mod age_stages {
    pub const CHILD: &str = "child";
    pub const YOUTHFUL: &str = "youthful";
    pub const SEASONED: &str = "seasoned";
    pub const OLDER: &str = "older";
    pub const GERIATRIC: &str = "geriatric";
    pub const ANCIENT: &str = "ancient";

    /// Stages on a Scion or threat age track.
    pub const SCION: [&str; 5] = [YOUTHFUL, SEASONED, OLDER, GERIATRIC, ANCIENT];

    /// Stages on a named NPC age track (a child stage precedes the rest).
    pub const NPC: [&str; 6] = [CHILD, YOUTHFUL, SEASONED, OLDER, GERIATRIC, ANCIENT];

    /// Display label for a stage key.
    pub fn label(key: &str) -> &'static str {
        match key {
            CHILD => "Child",
            YOUTHFUL => "Youthful",
            SEASONED => "Seasoned",
            OLDER => "Older",
            GERIATRIC => "Geriatric",
            ANCIENT => "Ancient",
            _ => "Unknown",
        }
    }
}

/// Trauma value of each consequence slot.
pub mod consequences {
    pub const MINOR: i32 = 2;
    pub const MINOR2: i32 = 2;
    pub const MODERATE: i32 = 4;
    pub const SEVERE: i32 = 6;
}

/// Colony attribute column rules.
pub mod colony {
    /// Lowest rank shown on the colony column.
    pub const MIN_RANK: i32 = 0;
    /// Highest rank shown on the colony column.
    pub const MAX_RANK: i32 = 6;
    /// The population track never holds more boxes than this.
    pub const MAX_POPULATION_BOXES: usize = 6;
    /// Base of the expected attribute total (plus the generation number).
    pub const BASE_TOTAL: i32 = 6;
    /// Name of the attribute that sizes the population track.
    pub const POPULATION: &str = "Population";
}

/// Faction rules.
pub mod faction {
    /// Capability whose rating sizes the people track; may not go below 0.
    pub const PEOPLE: &str = "People";
    /// Default floor for skills and capabilities.
    pub const DEFAULT_FLOOR: i32 = -1;
    /// Refresh before milestones and extra stunts.
    pub const BASE_REFRESH: i32 = 3;
    /// Stunts allowed before each extra one costs a point of refresh.
    pub const FREE_STUNTS: u32 = 3;
    /// Refresh never drops below this.
    pub const MIN_REFRESH: i32 = 1;
}

/// Bounds applied by the +/- adjusters on sheets.
pub mod limits {
    use crate::track::SizeBounds;

    /// Skill slots on each threat column.
    pub const SKILL_COLUMN_SLOTS: usize = 8;
    pub const THREAT_SKILL_COUNT: SizeBounds = SizeBounds::new(1, 8);
    pub const THREAT_STRESS_MAX: SizeBounds = SizeBounds::new(1, 10);
    pub const THREAT_LADDER_RUNGS: SizeBounds = SizeBounds::new(2, 10);
    pub const EXTRA_INVOKES: SizeBounds = SizeBounds::new(0, 10);
    pub const EXTRA_LADDER_RUNGS: SizeBounds = SizeBounds::new(1, 10);
    pub const EXTRA_TRACK_LENGTH: SizeBounds = SizeBounds::new(1, 10);
    /// Rung count an extra ladder falls back to when none is stored.
    pub const DEFAULT_EXTRA_RUNGS: usize = 5;
}
