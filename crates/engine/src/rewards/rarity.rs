//! Rarity selection - weighted draw over a tier's probability table

use crate::random::RandomSource;
use lootinyang_core::{BoxTier, Rarity, Result};
use tracing::debug;

/// Probability of each rarity, indexed in `Rarity::ALL` order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityTable {
    pub probabilities: [f64; 4],
}

const DAILY: RarityTable = RarityTable::new([0.70, 0.25, 0.04, 0.01]);
const WEEKLY: RarityTable = RarityTable::new([0.40, 0.40, 0.15, 0.05]);
const MONTHLY: RarityTable = RarityTable::new([0.20, 0.35, 0.30, 0.15]);
const SPECIAL: RarityTable = RarityTable::new([0.05, 0.30, 0.45, 0.20]);

impl RarityTable {
    pub const fn new(probabilities: [f64; 4]) -> Self {
        Self { probabilities }
    }

    /// The fixed odds for a box tier
    pub fn for_tier(tier: BoxTier) -> &'static RarityTable {
        match tier {
            BoxTier::Daily => &DAILY,
            BoxTier::Weekly => &WEEKLY,
            BoxTier::Monthly => &MONTHLY,
            BoxTier::Special => &SPECIAL,
        }
    }

    pub fn probability(&self, rarity: Rarity) -> f64 {
        self.probabilities[rarity.index()]
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Map a roll in `[0, 1)` to a rarity.
    ///
    /// Walks common → legendary accumulating mass and returns the first
    /// rarity whose cumulative mass reaches `roll`. When rounding leaves the
    /// total short of the roll, the result is `Common`.
    pub fn pick(&self, roll: f64) -> Rarity {
        let mut cumulative = 0.0;
        for rarity in Rarity::ALL {
            cumulative += self.probability(rarity);
            if roll <= cumulative {
                return rarity;
            }
        }
        debug!(roll, cumulative, "rarity roll past cumulative mass, falling back to common");
        Rarity::Common
    }
}

/// Draw a rarity for one item slot of a box
pub fn select_rarity<R: RandomSource + ?Sized>(tier: BoxTier, rng: &mut R) -> Rarity {
    RarityTable::for_tier(tier).pick(rng.next_f64())
}

/// Same as `select_rarity` for a tier given by name; unknown names are an
/// `InvalidTier` error
pub fn select_rarity_for_tag<R: RandomSource + ?Sized>(tier: &str, rng: &mut R) -> Result<Rarity> {
    let tier: BoxTier = tier.parse()?;
    Ok(select_rarity(tier, rng))
}
