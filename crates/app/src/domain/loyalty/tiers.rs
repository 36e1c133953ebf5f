//! Loyalty Tiers

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
}

impl LoyaltyTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl Display for LoyaltyTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Minimum balance to hold a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThreshold {
    pub tier: LoyaltyTier,
    pub min_points: u64,
}

/// Next tier up and how many points it takes to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTier {
    pub tier: LoyaltyTier,
    pub points_needed: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierLadderError {
    #[error("tier ladder must start at zero points")]
    MissingBaseTier,

    #[error("tier thresholds must strictly increase")]
    Unordered,
}

/// Ordered tier thresholds, lowest first. The first threshold is always zero
/// so every balance has a tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierLadder {
    thresholds: SmallVec<[TierThreshold; 4]>,
}

impl TierLadder {
    /// Build a ladder from thresholds given lowest first.
    ///
    /// # Errors
    ///
    /// Returns an error when the first threshold is not zero or thresholds do
    /// not strictly increase.
    pub fn new(
        thresholds: impl IntoIterator<Item = TierThreshold>,
    ) -> Result<Self, TierLadderError> {
        let thresholds: SmallVec<[TierThreshold; 4]> = thresholds.into_iter().collect();

        match thresholds.first() {
            Some(base) if base.min_points == 0 => {}
            _ => return Err(TierLadderError::MissingBaseTier),
        }

        if thresholds
            .windows(2)
            .any(|pair| matches!(pair, [lower, upper] if lower.min_points >= upper.min_points))
        {
            return Err(TierLadderError::Unordered);
        }

        Ok(Self { thresholds })
    }

    /// Standard three-tier ladder with configurable upper boundaries.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < silver < gold`.
    pub fn with_boundaries(silver: u64, gold: u64) -> Result<Self, TierLadderError> {
        Self::new([
            TierThreshold {
                tier: LoyaltyTier::Bronze,
                min_points: 0,
            },
            TierThreshold {
                tier: LoyaltyTier::Silver,
                min_points: silver,
            },
            TierThreshold {
                tier: LoyaltyTier::Gold,
                min_points: gold,
            },
        ])
    }

    #[must_use]
    pub fn thresholds(&self) -> &[TierThreshold] {
        &self.thresholds
    }

    #[must_use]
    pub fn tier_for(&self, points: u64) -> LoyaltyTier {
        self.thresholds
            .iter()
            .rev()
            .find(|threshold| points >= threshold.min_points)
            .map_or(LoyaltyTier::Bronze, |threshold| threshold.tier)
    }

    #[must_use]
    pub fn next_tier(&self, points: u64) -> Option<NextTier> {
        self.thresholds
            .iter()
            .find(|threshold| threshold.min_points > points)
            .map(|threshold| NextTier {
                tier: threshold.tier,
                points_needed: threshold.min_points - points,
            })
    }
}

impl Default for TierLadder {
    fn default() -> Self {
        Self {
            thresholds: smallvec![
                TierThreshold {
                    tier: LoyaltyTier::Bronze,
                    min_points: 0,
                },
                TierThreshold {
                    tier: LoyaltyTier::Silver,
                    min_points: 500,
                },
                TierThreshold {
                    tier: LoyaltyTier::Gold,
                    min_points: 1_000,
                },
            ],
        }
    }
}
