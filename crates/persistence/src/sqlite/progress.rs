//! Experience, level and streak counters per user

use lootinyang_core::{Error, ProgressRecord, Result};
use sqlx::{Executor, Sqlite};

/// Database row for user progress
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProgressRow {
    user_id: String,
    level: i64,
    experience: i64,
    current_streak: i64,
    weekly_target_streak: i64,
}

impl From<ProgressRow> for ProgressRecord {
    fn from(row: ProgressRow) -> Self {
        ProgressRecord {
            user_id: row.user_id,
            level: row.level.max(1) as u32,
            experience: row.experience,
            current_streak: row.current_streak.max(0) as u32,
            weekly_target_streak: row.weekly_target_streak.max(0) as u32,
        }
    }
}

/// Get a user's progress, if any has been recorded
pub async fn get_progress<'e, E>(executor: E, user_id: &str) -> Result<Option<ProgressRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<ProgressRow> = sqlx::query_as(
        r#"
        SELECT user_id, level, experience, current_streak, weekly_target_streak
        FROM user_progress
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(row.map(ProgressRecord::from))
}

/// Get a user's progress, creating a level 1 record on first use
pub async fn get_or_create_progress<'e, E>(executor: E, user_id: &str) -> Result<ProgressRecord>
where
    E: Executor<'e, Database = Sqlite>,
{
    // the no-op update makes RETURNING yield the existing row too
    let row: Option<ProgressRow> = sqlx::query_as(
        r#"
        INSERT INTO user_progress (user_id) VALUES (?)
        ON CONFLICT(user_id) DO UPDATE SET user_id = excluded.user_id
        RETURNING user_id, level, experience, current_streak, weekly_target_streak
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(ProgressRecord::from)
        .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
}

/// Insert or overwrite a user's progress
pub async fn save_progress<'e, E>(executor: E, progress: &ProgressRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"INSERT INTO user_progress (user_id, level, experience, current_streak, weekly_target_streak, updated_at)
           VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
           ON CONFLICT(user_id) DO UPDATE SET
             level = excluded.level,
             experience = excluded.experience,
             current_streak = excluded.current_streak,
             weekly_target_streak = excluded.weekly_target_streak,
             updated_at = excluded.updated_at"#,
    )
    .bind(&progress.user_id)
    .bind(progress.level as i64)
    .bind(progress.experience)
    .bind(progress.current_streak as i64)
    .bind(progress.weekly_target_streak as i64)
    .execute(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::Database;

    #[tokio::test]
    async fn test_new_user_starts_at_level_one() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(get_progress(db.pool(), "u1").await.unwrap().is_none());

        let progress = get_or_create_progress(db.pool(), "u1").await.unwrap();
        assert_eq!(progress, ProgressRecord::new("u1"));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut progress = get_or_create_progress(db.pool(), "u1").await.unwrap();
        progress.experience = 250;
        progress.level = 3;
        progress.current_streak = 4;
        save_progress(db.pool(), &progress).await.unwrap();

        assert_eq!(get_or_create_progress(db.pool(), "u1").await.unwrap(), progress);
    }
}
