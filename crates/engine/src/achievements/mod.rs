//! Achievement evaluation
//!
//! Decides which achievements a progress snapshot newly qualifies for.
//! Unlocking is terminal: an id in `already_unlocked` is never returned.

use lootinyang_core::{Achievement, AchievementCondition, UserProgress};
use std::collections::HashSet;
use tracing::debug;

/// Whether `progress` satisfies `condition`
pub fn evaluate_condition(condition: AchievementCondition, progress: &UserProgress) -> bool {
    match condition {
        AchievementCondition::CreateFirstHabit => progress.total_habits >= 1,
        AchievementCondition::Streak7Days => progress.current_streak >= 7,
        AchievementCondition::Streak30Days => progress.current_streak >= 30,
        AchievementCondition::ThreeWeeksSuccess => progress.weekly_target_streak >= 3,
        AchievementCondition::Create5Habits => progress.total_habits >= 5,
        AchievementCondition::Open10Boxes => progress.total_boxes_opened >= 10,
        AchievementCondition::ReachLevel50 => progress.level >= 50,
        // Needs month-level aggregation the snapshot does not carry
        AchievementCondition::PerfectMonth => false,
    }
}

/// Evaluate a raw condition tag; unrecognized tags never qualify
pub fn evaluate_tag(tag: &str, progress: &UserProgress) -> bool {
    match tag.parse::<AchievementCondition>() {
        Ok(condition) => evaluate_condition(condition, progress),
        Err(_) => {
            debug!(tag, "unrecognized achievement condition");
            false
        }
    }
}

/// Ids of catalog achievements that qualify and are not yet unlocked,
/// in catalog order
pub fn evaluate_all(
    progress: &UserProgress,
    catalog: &[Achievement],
    already_unlocked: &HashSet<String>,
) -> Vec<String> {
    catalog
        .iter()
        .filter(|a| !already_unlocked.contains(&a.id))
        .filter(|a| evaluate_condition(a.condition, progress))
        .map(|a| a.id.clone())
        .collect()
}
