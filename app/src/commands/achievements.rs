//! Achievement unlocking

use super::progress::load_progress;
use crate::AppState;
use chrono::{DateTime, NaiveDate, Utc};
use lootinyang_core::{Achievement, Result};
use lootinyang_engine::{achievement_catalog, evaluate_all};
use lootinyang_persistence::sqlite;
use serde::Serialize;
use tracing::info;

/// A catalog achievement with the user's unlock time, if any
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Evaluate the catalog against fresh progress and unlock whatever newly
/// qualifies. Returns the achievements unlocked by this call.
pub async fn refresh_achievements(
    state: &AppState,
    user_id: &str,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<Achievement>> {
    let pool = state.db.pool();
    let progress = load_progress(state, user_id, today).await?;
    let already = sqlite::unlocked_achievement_ids(pool, user_id).await?;

    let mut unlocked = Vec::new();
    for id in evaluate_all(&progress, achievement_catalog(), &already) {
        if !sqlite::unlock_achievement(pool, user_id, &id, now).await? {
            continue;
        }
        if let Some(achievement) = achievement_catalog().iter().find(|a| a.id == id) {
            info!(user_id, achievement = %id, "achievement unlocked");
            state.notifications.notify_achievement(achievement).await;
            unlocked.push(achievement.clone());
        }
    }
    Ok(unlocked)
}

/// Every catalog achievement with its unlock state for `user_id`
pub async fn list_achievements(state: &AppState, user_id: &str) -> Result<Vec<AchievementStatus>> {
    let unlocks = sqlite::list_user_achievements(state.db.pool(), user_id).await?;

    Ok(achievement_catalog()
        .iter()
        .map(|a| AchievementStatus {
            achievement: a.clone(),
            unlocked_at: unlocks
                .iter()
                .find(|u| u.achievement_id == a.id)
                .map(|u| u.unlocked_at),
        })
        .collect())
}
