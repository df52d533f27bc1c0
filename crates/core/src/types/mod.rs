//! Shared enumerations for boxes, items, badges and habits

use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All rarities in draw order (cumulative probability walks this order)
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// Index into `Rarity::ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Rarity::Common),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            other => Err(Error::InvalidData(format!("unknown rarity '{}'", other))),
        }
    }
}

/// Reward box category, determines item count and rarity odds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxTier {
    Daily,
    Weekly,
    Monthly,
    Special,
}

impl BoxTier {
    pub const ALL: [BoxTier; 4] = [BoxTier::Daily, BoxTier::Weekly, BoxTier::Monthly, BoxTier::Special];

    /// Number of items awarded when a box of this tier is opened
    pub fn item_count(&self) -> usize {
        match self {
            BoxTier::Daily => 1,
            BoxTier::Weekly => 2,
            BoxTier::Monthly | BoxTier::Special => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxTier::Daily => "daily",
            BoxTier::Weekly => "weekly",
            BoxTier::Monthly => "monthly",
            BoxTier::Special => "special",
        }
    }
}

impl fmt::Display for BoxTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BoxTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(BoxTier::Daily),
            "weekly" => Ok(BoxTier::Weekly),
            "monthly" => Ok(BoxTier::Monthly),
            "special" => Ok(BoxTier::Special),
            other => Err(Error::InvalidTier(other.to_string())),
        }
    }
}

/// What an item does once owned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Random,
    Protection,
    Special,
}

/// Badge tier shown next to an unlocked achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl BadgeTier {
    /// Hex color used for the badge
    pub fn color(&self) -> &'static str {
        match self {
            BadgeTier::Bronze => "#CD7F32",
            BadgeTier::Silver => "#C0C0C0",
            BadgeTier::Gold => "#FFD700",
            BadgeTier::Diamond => "#B9F2FF",
        }
    }
}

/// How often a habit is expected to be checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    Daily,
    Weekly,
}

impl HabitFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitFrequency::Daily => "daily",
            HabitFrequency::Weekly => "weekly",
        }
    }
}

impl FromStr for HabitFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(HabitFrequency::Daily),
            "weekly" => Ok(HabitFrequency::Weekly),
            other => Err(Error::InvalidData(format!("unknown habit frequency '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_counts_per_tier() {
        assert_eq!(BoxTier::Daily.item_count(), 1);
        assert_eq!(BoxTier::Weekly.item_count(), 2);
        assert_eq!(BoxTier::Monthly.item_count(), 3);
        assert_eq!(BoxTier::Special.item_count(), 3);
    }

    #[test]
    fn test_unknown_tier_is_invalid_tier_error() {
        let err = "yearly".parse::<BoxTier>().unwrap_err();
        assert!(matches!(err, Error::InvalidTier(t) if t == "yearly"));
    }

    #[test]
    fn test_tier_round_trips_through_str() {
        for tier in BoxTier::ALL {
            assert_eq!(tier.as_str().parse::<BoxTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_rarity_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Rarity::Legendary).unwrap(), "\"legendary\"");
        let r: Rarity = serde_json::from_str("\"epic\"").unwrap();
        assert_eq!(r, Rarity::Epic);
    }
}
