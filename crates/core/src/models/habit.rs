//! Habits and daily check-offs

use crate::types::HabitFrequency;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A tracked habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub frequency: HabitFrequency,
    /// Checks per week needed to meet the weekly target (weekly habits)
    #[serde(default)]
    pub weekly_target: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a habit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub frequency: HabitFrequency,
    #[serde(default)]
    pub weekly_target: u32,
}

impl NewHabit {
    pub fn daily(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            icon: String::new(),
            frequency: HabitFrequency::Daily,
            weekly_target: 0,
        }
    }

    pub fn weekly(name: &str, weekly_target: u32) -> Self {
        Self {
            frequency: HabitFrequency::Weekly,
            weekly_target,
            ..Self::daily(name)
        }
    }
}

/// One check-off of a habit on a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCheck {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: String,
    pub check_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
