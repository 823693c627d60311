//! Dice types and rolling

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DieError {
    #[error("Unknown die '{0}': expected one of D4, D6, D8, D10, D12, D20, D100")]
    Unknown(String),
}

/// A polyhedral die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Die {
    D4,
    #[default]
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl Die {
    pub const ALL: [Die; 7] = [Die::D4, Die::D6, Die::D8, Die::D10, Die::D12, Die::D20, Die::D100];

    /// Number of faces
    pub fn sides(self) -> u32 {
        match self {
            Die::D4 => 4,
            Die::D6 => 6,
            Die::D8 => 8,
            Die::D10 => 10,
            Die::D12 => 12,
            Die::D20 => 20,
            Die::D100 => 100,
        }
    }

    /// Rolls the die, returning a value in `1..=sides`
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        rng.gen_range(1..=self.sides())
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.sides())
    }
}

impl FromStr for Die {
    type Err = DieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Die::ALL
            .into_iter()
            .find(|die| die.to_string().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DieError::Unknown(s.to_string()))
    }
}

impl TryFrom<String> for Die {
    type Error = DieError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Die> for String {
    fn from(die: Die) -> Self {
        die.to_string()
    }
}

/// Text shown in the node body after a roll
pub fn roll_display(result: u32) -> String {
    format!("🎲 {}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parse_dice() {
        assert_eq!("D20".parse::<Die>().unwrap(), Die::D20);
        assert_eq!("d100".parse::<Die>().unwrap(), Die::D100);
        assert!("D7".parse::<Die>().is_err());
        assert!("".parse::<Die>().is_err());
    }

    #[test]
    fn rolls_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for die in Die::ALL {
            for _ in 0..200 {
                let n = die.roll(&mut rng);
                assert!((1..=die.sides()).contains(&n), "{} rolled {}", die, n);
            }
        }
    }

    #[test]
    fn serde_uses_display_name() {
        let json = serde_json::to_string(&Die::D12).unwrap();
        assert_eq!(json, "\"D12\"");
        let die: Die = serde_json::from_str("\"D4\"").unwrap();
        assert_eq!(die, Die::D4);
    }
}
