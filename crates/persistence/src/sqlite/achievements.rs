//! Per-user achievement unlocks

use chrono::{DateTime, Utc};
use lootinyang_core::{Error, Result, UserAchievement};
use sqlx::SqlitePool;
use std::collections::HashSet;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserAchievementRow {
    user_id: String,
    achievement_id: String,
    unlocked_at: DateTime<Utc>,
}

impl From<UserAchievementRow> for UserAchievement {
    fn from(row: UserAchievementRow) -> Self {
        UserAchievement {
            user_id: row.user_id,
            achievement_id: row.achievement_id,
            unlocked_at: row.unlocked_at,
        }
    }
}

/// Record an unlock. Returns false when the user already had it.
pub async fn unlock_achievement(
    pool: &SqlitePool,
    user_id: &str,
    achievement_id: &str,
    unlocked_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, unlocked_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(achievement_id)
    .bind(unlocked_at)
    .execute(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}

/// A user's unlocks, oldest first
pub async fn list_user_achievements(pool: &SqlitePool, user_id: &str) -> Result<Vec<UserAchievement>> {
    let rows: Vec<UserAchievementRow> = sqlx::query_as(
        r#"
        SELECT user_id, achievement_id, unlocked_at
        FROM user_achievements
        WHERE user_id = ?
        ORDER BY unlocked_at, achievement_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(rows.into_iter().map(UserAchievement::from).collect())
}

/// Ids of everything a user has unlocked
pub async fn unlocked_achievement_ids(pool: &SqlitePool, user_id: &str) -> Result<HashSet<String>> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT achievement_id FROM user_achievements WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(ids.into_iter().collect())
}
