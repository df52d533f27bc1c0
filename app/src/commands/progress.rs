//! Progress snapshot assembly

use crate::AppState;
use chrono::{Duration, NaiveDate};
use lootinyang_core::{Error, HabitFrequency, Result, UserProgress};
use lootinyang_engine::progression::{current_streak, week_start, weekly_target_met, weekly_target_streak};
use lootinyang_persistence::sqlite;
use serde::Serialize;
use sqlx::SqliteConnection;
use std::collections::{BTreeMap, HashMap};

/// How far back daily checks are read when counting a streak
const STREAK_LOOKBACK_DAYS: i64 = 400;
/// How many weeks back weekly targets are inspected
const WEEKLY_LOOKBACK_WEEKS: i64 = 53;

/// Progress with level details for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    #[serde(flatten)]
    pub progress: UserProgress,
    /// Experience inside the current level and the size of a level
    pub level_exp: i64,
    pub level_span: i64,
}

/// Assemble the fact snapshot achievements are evaluated against
pub async fn load_progress(state: &AppState, user_id: &str, today: NaiveDate) -> Result<UserProgress> {
    let mut conn = state
        .db
        .pool()
        .acquire()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;
    let record = sqlite::get_or_create_progress(&mut *conn, user_id).await?;

    Ok(UserProgress {
        user_id: user_id.to_string(),
        total_habits: sqlite::count_active_habits(&mut *conn, user_id).await?,
        current_streak: daily_streak(&mut conn, user_id, today).await?,
        level: record.level,
        experience: record.experience,
        total_boxes_opened: sqlite::count_opened_boxes(&mut *conn, user_id).await?,
        weekly_target_streak: weekly_streak(&mut conn, user_id, today).await?,
    })
}

/// `load_progress` plus level progress for the status screen
pub async fn progress_report(state: &AppState, user_id: &str, today: NaiveDate) -> Result<ProgressReport> {
    let progress = load_progress(state, user_id, today).await?;
    let (level_exp, level_span) = state.progression_config().await.level_progress(progress.experience);
    Ok(ProgressReport {
        progress,
        level_exp,
        level_span,
    })
}

/// Consecutive days on which every active daily habit was checked
pub(crate) async fn daily_streak(conn: &mut SqliteConnection, user_id: &str, today: NaiveDate) -> Result<u32> {
    let daily_habits = sqlite::list_habits(&mut *conn, user_id, false)
        .await?
        .iter()
        .filter(|h| h.frequency == HabitFrequency::Daily)
        .count();
    if daily_habits == 0 {
        return Ok(0);
    }

    let since = today - Duration::days(STREAK_LOOKBACK_DAYS);
    let completed = sqlite::daily_completions(&mut *conn, user_id, since).await?;
    Ok(current_streak(today, daily_habits, &completed))
}

/// Consecutive weeks in which every active weekly habit met its target
pub(crate) async fn weekly_streak(conn: &mut SqliteConnection, user_id: &str, today: NaiveDate) -> Result<u32> {
    let weekly: Vec<_> = sqlite::list_habits(&mut *conn, user_id, false)
        .await?
        .into_iter()
        .filter(|h| h.frequency == HabitFrequency::Weekly)
        .collect();
    if weekly.is_empty() {
        return Ok(0);
    }

    let this_week = week_start(today);
    let first_week = this_week - Duration::weeks(WEEKLY_LOOKBACK_WEEKS);
    let checks = sqlite::list_checks(&mut *conn, user_id, first_week).await?;

    let mut counts: HashMap<(i64, NaiveDate), u32> = HashMap::new();
    for check in checks.iter().filter(|c| c.check_date <= today) {
        *counts.entry((check.habit_id, week_start(check.check_date))).or_default() += 1;
    }

    let mut results = BTreeMap::new();
    let mut week = first_week;
    while week <= this_week {
        let met = weekly.iter().all(|h| {
            let done = counts.get(&(h.id, week)).copied().unwrap_or(0);
            weekly_target_met(done, h.weekly_target)
        });
        results.insert(week, met);
        week = week + Duration::weeks(1);
    }

    Ok(weekly_target_streak(this_week, &results))
}
