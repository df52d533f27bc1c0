//! Achievements, their unlock conditions and per-user unlocks

use crate::errors::Error;
use crate::types::BadgeTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of evaluable unlock predicates.
///
/// Adding a condition means adding a variant here, which forces every
/// `match` over it (the evaluator in particular) to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCondition {
    CreateFirstHabit,
    #[serde(rename = "streak_7_days")]
    Streak7Days,
    #[serde(rename = "streak_30_days")]
    Streak30Days,
    ThreeWeeksSuccess,
    #[serde(rename = "create_5_habits")]
    Create5Habits,
    #[serde(rename = "open_10_boxes")]
    Open10Boxes,
    #[serde(rename = "reach_level_50")]
    ReachLevel50,
    PerfectMonth,
}

impl AchievementCondition {
    pub const ALL: [AchievementCondition; 8] = [
        AchievementCondition::CreateFirstHabit,
        AchievementCondition::Streak7Days,
        AchievementCondition::Streak30Days,
        AchievementCondition::ThreeWeeksSuccess,
        AchievementCondition::Create5Habits,
        AchievementCondition::Open10Boxes,
        AchievementCondition::ReachLevel50,
        AchievementCondition::PerfectMonth,
    ];

    /// The string tag stored in catalogs and backups
    pub fn tag(&self) -> &'static str {
        match self {
            AchievementCondition::CreateFirstHabit => "create_first_habit",
            AchievementCondition::Streak7Days => "streak_7_days",
            AchievementCondition::Streak30Days => "streak_30_days",
            AchievementCondition::ThreeWeeksSuccess => "three_weeks_success",
            AchievementCondition::Create5Habits => "create_5_habits",
            AchievementCondition::Open10Boxes => "open_10_boxes",
            AchievementCondition::ReachLevel50 => "reach_level_50",
            AchievementCondition::PerfectMonth => "perfect_month",
        }
    }
}

impl fmt::Display for AchievementCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AchievementCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AchievementCondition::ALL
            .into_iter()
            .find(|c| c.tag() == s)
            .ok_or_else(|| Error::InvalidCondition(s.to_string()))
    }
}

/// Catalog entry describing an unlockable achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition: AchievementCondition,
    pub points: u32,
    pub badge: BadgeTier,
}

/// Record that a user unlocked an achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}
