//! User progression facts

use serde::{Deserialize, Serialize};

/// Read-only snapshot of a user's progress, assembled by the caller and
/// handed to the achievement evaluator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    /// Active habits
    pub total_habits: u32,
    /// Consecutive days with every habit checked
    pub current_streak: u32,
    pub level: u32,
    pub experience: i64,
    pub total_boxes_opened: u32,
    /// Consecutive weeks with every weekly target met
    pub weekly_target_streak: u32,
}

/// Persisted experience/level/streak counters for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: String,
    pub level: u32,
    pub experience: i64,
    pub current_streak: u32,
    pub weekly_target_streak: u32,
}

impl ProgressRecord {
    /// Starting point for a user with no history
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            level: 1,
            experience: 0,
            current_streak: 0,
            weekly_target_streak: 0,
        }
    }
}
