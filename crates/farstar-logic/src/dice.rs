//! Fate dice (4dF) rolls and result banding.
//!
//! Four dice, each -1, 0 or +1, summed and added to a modifier. The
//! outcome carries a color band for the host's roll log:
//!
//! 1. final result below 1 → [`ColorBand::Red`]
//! 2. dice total above +1 → [`ColorBand::Green`]
//! 3. dice total below -1 → [`ColorBand::Orange`]
//! 4. otherwise → [`ColorBand::Blue`]
//!
//! The first matching rule wins, so a heavily penalized roll with hot
//! dice is still red.
//!
//! ```
//! use farstar_logic::dice::{evaluate, ColorBand, FateDie};
//!
//! let outcome = evaluate([FateDie::Plus, FateDie::Plus, FateDie::Blank, FateDie::Minus], 2);
//! assert_eq!(outcome.total, 1);
//! assert_eq!(outcome.final_result, 3);
//! assert_eq!(outcome.band, ColorBand::Blue);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::format::Signed;

/// Number of dice in a Fate roll.
pub const DICE_PER_ROLL: usize = 4;

/// A single Fate die face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FateDie {
    Minus,
    Blank,
    Plus,
}

impl FateDie {
    pub fn value(self) -> i32 {
        match self {
            Self::Minus => -1,
            Self::Blank => 0,
            Self::Plus => 1,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::Minus),
            0 => Some(Self::Blank),
            1 => Some(Self::Plus),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Minus => '-',
            Self::Blank => '0',
            Self::Plus => '+',
        }
    }

    /// Roll one die, each face equally likely.
    pub fn roll(rng: &mut impl Rng) -> Self {
        match rng.gen_range(-1..=1) {
            -1 => Self::Minus,
            0 => Self::Blank,
            _ => Self::Plus,
        }
    }
}

/// Color band of a roll result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Red,
    Orange,
    Blue,
    Green,
}

/// One evaluated roll. Produced per request and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    pub dice: [FateDie; DICE_PER_ROLL],
    /// Sum of the dice alone.
    pub total: i32,
    pub modifier: i32,
    /// `total + modifier`.
    pub final_result: i32,
    pub band: ColorBand,
}

impl RollOutcome {
    /// Die values as integers.
    pub fn die_results(&self) -> [i32; DICE_PER_ROLL] {
        self.dice.map(FateDie::value)
    }

    /// One-line summary for a roll log, e.g. `+ + 0 - | 1 +2 = 3`.
    pub fn summary(&self) -> String {
        let faces: Vec<String> = self.dice.iter().map(|d| d.symbol().to_string()).collect();
        if self.modifier == 0 {
            format!("{} | {} = {}", faces.join(" "), self.total, self.final_result)
        } else {
            format!(
                "{} | {} {} = {}",
                faces.join(" "),
                self.total,
                Signed(self.modifier),
                self.final_result
            )
        }
    }
}

/// Band for a dice total and modifier, first matching rule wins.
pub fn classify(total: i32, modifier: i32) -> ColorBand {
    let final_result = total + modifier;
    if final_result < 1 {
        ColorBand::Red
    } else if final_result - modifier > 1 {
        ColorBand::Green
    } else if final_result - modifier < -1 {
        ColorBand::Orange
    } else {
        ColorBand::Blue
    }
}

/// Evaluate already-rolled dice against a modifier.
pub fn evaluate(dice: [FateDie; DICE_PER_ROLL], modifier: i32) -> RollOutcome {
    let total: i32 = dice.iter().map(|d| d.value()).sum();
    RollOutcome {
        dice,
        total,
        modifier,
        final_result: total + modifier,
        band: classify(total, modifier),
    }
}

/// Roll 4dF with `rng` and add `modifier`.
pub fn roll_fate(modifier: i32, rng: &mut impl Rng) -> RollOutcome {
    let dice = [(); DICE_PER_ROLL].map(|_| FateDie::roll(&mut *rng));
    let outcome = evaluate(dice, modifier);
    log::debug!("4dF {} -> {:?}", outcome.summary(), outcome.band);
    outcome
}

/// Roll 4dF with the thread-local generator.
pub fn roll_fate_thread(modifier: i32) -> RollOutcome {
    roll_fate(modifier, &mut rand::thread_rng())
}
