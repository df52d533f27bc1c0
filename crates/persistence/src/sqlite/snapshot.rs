//! Whole-database export and import

use super::achievements::UserAchievementRow;
use super::boxes::{RewardBoxRow, RewardIssuance, BOX_COLUMNS};
use super::habits::{HabitCheckRow, HabitRow, HABIT_COLUMNS};
use super::progress::ProgressRow;
use crate::backup::BackupData;
use lootinyang_core::{Error, Habit, HabitCheck, ProgressRecord, Result, RewardBox, UserAchievement};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::info;

/// Read every table into a `BackupData`
pub async fn export_data(pool: &SqlitePool) -> Result<BackupData> {
    let progress: Vec<ProgressRow> = sqlx::query_as(
        "SELECT user_id, level, experience, current_streak, weekly_target_streak FROM user_progress ORDER BY user_id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let habits: Vec<HabitRow> =
        sqlx::query_as(&format!("SELECT {} FROM habits ORDER BY id", HABIT_COLUMNS))
            .fetch_all(pool)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let checks: Vec<HabitCheckRow> = sqlx::query_as(
        "SELECT id, habit_id, user_id, check_date, created_at FROM habit_checks ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let boxes: Vec<RewardBoxRow> =
        sqlx::query_as(&format!("SELECT {} FROM reward_boxes ORDER BY id", BOX_COLUMNS))
            .fetch_all(pool)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let issuance: Vec<RewardIssuance> = sqlx::query_as(
        "SELECT user_id, tier, period_key, box_id FROM reward_issuance ORDER BY user_id, tier, period_key",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let achievements: Vec<UserAchievementRow> = sqlx::query_as(
        "SELECT user_id, achievement_id, unlocked_at FROM user_achievements ORDER BY user_id, achievement_id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let settings_rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(pool)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let mut settings = BTreeMap::new();
    for (key, value) in settings_rows {
        settings.insert(key, serde_json::from_str(&value)?);
    }

    Ok(BackupData {
        progress: progress.into_iter().map(ProgressRecord::from).collect(),
        habits: habits.into_iter().map(Habit::try_from).collect::<Result<_>>()?,
        habit_checks: checks.into_iter().map(HabitCheck::from).collect(),
        reward_boxes: boxes.into_iter().map(RewardBox::try_from).collect::<Result<_>>()?,
        reward_issuance: issuance,
        user_achievements: achievements.into_iter().map(UserAchievement::from).collect(),
        settings,
    })
}

/// Replace every table with the contents of `data`, atomically
pub async fn import_data(pool: &SqlitePool, data: &BackupData) -> Result<()> {
    let db_err = |e: sqlx::Error| Error::DatabaseError(e.to_string());

    let mut tx = pool.begin().await.map_err(db_err)?;

    for table in [
        "habit_checks",
        "habits",
        "reward_issuance",
        "reward_boxes",
        "user_achievements",
        "user_progress",
        "settings",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
    }

    for p in &data.progress {
        sqlx::query(
            "INSERT INTO user_progress (user_id, level, experience, current_streak, weekly_target_streak) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&p.user_id)
        .bind(p.level as i64)
        .bind(p.experience)
        .bind(p.current_streak as i64)
        .bind(p.weekly_target_streak as i64)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    for h in &data.habits {
        sqlx::query(
            r#"
            INSERT INTO habits (id, user_id, name, description, icon, frequency, weekly_target, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(h.id)
        .bind(&h.user_id)
        .bind(&h.name)
        .bind(&h.description)
        .bind(&h.icon)
        .bind(h.frequency.as_str())
        .bind(h.weekly_target as i64)
        .bind(h.is_active)
        .bind(h.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    for c in &data.habit_checks {
        sqlx::query(
            "INSERT INTO habit_checks (id, habit_id, user_id, check_date, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(c.id)
        .bind(c.habit_id)
        .bind(&c.user_id)
        .bind(c.check_date)
        .bind(c.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    for b in &data.reward_boxes {
        let items = serde_json::to_string(&b.items)?;
        sqlx::query(
            r#"
            INSERT INTO reward_boxes (id, user_id, tier, opened, items, created_at, opened_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(b.id)
        .bind(&b.user_id)
        .bind(b.tier.as_str())
        .bind(b.opened)
        .bind(&items)
        .bind(b.created_at)
        .bind(b.opened_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    for r in &data.reward_issuance {
        sqlx::query(
            "INSERT INTO reward_issuance (user_id, tier, period_key, box_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&r.user_id)
        .bind(&r.tier)
        .bind(&r.period_key)
        .bind(r.box_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    for a in &data.user_achievements {
        sqlx::query(
            "INSERT INTO user_achievements (user_id, achievement_id, unlocked_at) VALUES (?, ?, ?)",
        )
        .bind(&a.user_id)
        .bind(&a.achievement_id)
        .bind(a.unlocked_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    for (key, value) in &data.settings {
        sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(serde_json::to_string(value)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
    }

    tx.commit().await.map_err(db_err)?;

    info!(
        habits = data.habits.len(),
        checks = data.habit_checks.len(),
        boxes = data.reward_boxes.len(),
        "imported local data"
    );
    Ok(())
}
