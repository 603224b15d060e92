use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Four bounded stats: two scoring dimensions followed by two non-scoring ones.
///
/// Every component is in [`STAT_MIN`]..=[`STAT_MAX`]; the only constructors
/// check that, so a `StatVector` in hand is always legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StatVector([u8; STAT_COUNT]);

impl StatVector {
    /// A freshly cut gem: every stat at its minimum.
    pub const FRESH: StatVector = StatVector([STAT_MIN; STAT_COUNT]);

    pub fn new(values: [u8; STAT_COUNT]) -> Option<Self> {
        values
            .iter()
            .all(|v| (STAT_MIN..=STAT_MAX).contains(v))
            .then_some(StatVector(values))
    }

    #[inline(always)]
    pub fn values(&self) -> [u8; STAT_COUNT] {
        self.0
    }

    #[inline(always)]
    pub fn get(&self, dim: usize) -> u8 {
        self.0[dim]
    }

    /// Sum of the scoring dimensions.
    #[inline(always)]
    pub fn scoring_sum(&self) -> i32 {
        self.0[..SCORING_DIMS].iter().map(|&v| v as i32).sum()
    }

    /// Apply `delta` to one dimension, or `None` if the result leaves the legal range.
    pub fn with_delta(&self, dim: usize, delta: i8) -> Option<Self> {
        let next = self.0[dim] as i32 + delta as i32;
        if next < STAT_MIN as i32 || next > STAT_MAX as i32 {
            return None;
        }
        let mut values = self.0;
        values[dim] = next as u8;
        Some(StatVector(values))
    }
}

impl Default for StatVector {
    fn default() -> Self {
        Self::FRESH
    }
}

impl<'de> Deserialize<'de> for StatVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = <[u8; STAT_COUNT]>::deserialize(deserializer)?;
        StatVector::new(values).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "stat values must lie in [{STAT_MIN}, {STAT_MAX}], got {values:?}"
            ))
        })
    }
}

/// A node of the value recursion: (attempts left, rerolls left, stats).
///
/// Doubles as the memo key of [`crate::value_function::ValueTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessState {
    pub attempts: u32,
    pub rerolls: u32,
    pub stats: StatVector,
}

impl ProcessState {
    /// Root state for a budget: fresh stats, full attempts and rerolls.
    pub fn root(attempts: u32, rerolls: u32) -> Self {
        Self {
            attempts,
            rerolls,
            stats: StatVector::FRESH,
        }
    }
}

/// Gem grade. Selects the attempt/reroll budget and the fee multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Grade {
    /// Tier-high.
    #[serde(rename = "hero", alias = "tier-high")]
    #[value(name = "hero")]
    Hero,
    /// Tier-mid.
    #[serde(rename = "rare", alias = "tier-mid")]
    #[value(name = "rare")]
    Rare,
    /// Tier-low.
    #[serde(rename = "adv", alias = "tier-low")]
    #[value(name = "adv")]
    Advanced,
}

impl Grade {
    /// (attempts, rerolls) granted to a fresh gem of this grade.
    pub fn budget(self) -> (u32, u32) {
        match self {
            Grade::Hero => (9, 2),
            Grade::Rare => (7, 1),
            Grade::Advanced => (5, 0),
        }
    }

    /// Fee units charged per gem.
    pub fn fee_multiplier(self) -> f64 {
        match self {
            Grade::Hero => 12.0,
            Grade::Rare => 6.0,
            Grade::Advanced => 3.0,
        }
    }
}

/// Result of one simulated gem lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RolloutOutcome {
    pub final_score: i32,
    pub processing_cost: f64,
    pub restart_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(StatVector::new([1, 2, 3, 5]).is_some());
        assert!(StatVector::new([0, 1, 1, 1]).is_none());
        assert!(StatVector::new([1, 1, 6, 1]).is_none());
    }

    #[test]
    fn test_with_delta_bounds() {
        let s = StatVector::new([4, 1, 1, 1]).unwrap();
        assert_eq!(s.with_delta(0, 1).map(|v| v.get(0)), Some(5));
        assert!(s.with_delta(0, 2).is_none());
        assert!(s.with_delta(1, -1).is_none());
        assert_eq!(s.with_delta(0, -1).map(|v| v.get(0)), Some(3));
    }

    #[test]
    fn test_grade_budgets() {
        assert_eq!(Grade::Hero.budget(), (9, 2));
        assert_eq!(Grade::Rare.budget(), (7, 1));
        assert_eq!(Grade::Advanced.budget(), (5, 0));
    }

    #[test]
    fn test_grade_serde_names() {
        let g: Grade = serde_json::from_str("\"adv\"").unwrap();
        assert_eq!(g, Grade::Advanced);
        let g: Grade = serde_json::from_str("\"tier-high\"").unwrap();
        assert_eq!(g, Grade::Hero);
        assert_eq!(serde_json::to_string(&Grade::Rare).unwrap(), "\"rare\"");
    }

    #[test]
    fn test_stat_vector_deserialize_validates() {
        assert!(serde_json::from_str::<StatVector>("[1,2,3,4]").is_ok());
        assert!(serde_json::from_str::<StatVector>("[1,2,3,9]").is_err());
    }
}
