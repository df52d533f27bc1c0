//! Habit commands and the check-in workflow

use super::achievements::refresh_achievements;
use super::progress::{daily_streak, weekly_streak};
use crate::AppState;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use lootinyang_core::{
    Achievement, BoxTier, Error, Habit, HabitFrequency, NewHabit, Result, RewardBox,
};
use lootinyang_engine::progression::week_start;
use lootinyang_engine::{apply_experience, ExperienceGain};
use lootinyang_persistence::sqlite;
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{debug, info};

/// Streak length that earns the month's box
pub const MONTHLY_STREAK_DAYS: u32 = 30;

/// Result of checking a habit for a day
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CheckOutcome {
    Checked(CheckSummary),
    /// The habit was already checked that day; nothing changed
    AlreadyChecked { habit_id: i64, date: NaiveDate },
}

impl CheckOutcome {
    pub fn summary(&self) -> Option<&CheckSummary> {
        match self {
            CheckOutcome::Checked(summary) => Some(summary),
            CheckOutcome::AlreadyChecked { .. } => None,
        }
    }
}

/// Everything a single check changed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub habit_id: i64,
    pub date: NaiveDate,
    pub gain: ExperienceGain,
    pub previous_level: u32,
    pub current_streak: u32,
    pub weekly_target_streak: u32,
    pub boxes_issued: Vec<RewardBox>,
    pub achievements_unlocked: Vec<Achievement>,
}

impl CheckSummary {
    pub fn leveled_up(&self) -> bool {
        self.gain.leveled_up(self.previous_level)
    }
}

/// Create a habit and unlock any achievement it completes
pub async fn create_habit(
    state: &AppState,
    user_id: &str,
    habit: NewHabit,
    now: DateTime<Utc>,
) -> Result<(Habit, Vec<Achievement>)> {
    let created = sqlite::create_habit(state.db.pool(), user_id, &habit, now).await?;
    info!(user_id, habit_id = created.id, name = %created.name, "habit created");

    let unlocked = refresh_achievements(state, user_id, now.date_naive(), now).await?;
    Ok((created, unlocked))
}

/// Active habits of a user
pub async fn list_habits(state: &AppState, user_id: &str) -> Result<Vec<Habit>> {
    sqlite::list_habits(state.db.pool(), user_id, false).await
}

/// Archive one of the user's habits
pub async fn archive_habit(state: &AppState, user_id: &str, habit_id: i64) -> Result<bool> {
    owned_habit(state, user_id, habit_id).await?;
    sqlite::archive_habit(state.db.pool(), habit_id).await
}

async fn owned_habit(state: &AppState, user_id: &str, habit_id: i64) -> Result<Habit> {
    match sqlite::get_habit(state.db.pool(), habit_id).await? {
        Some(habit) if habit.user_id == user_id => Ok(habit),
        _ => Err(Error::HabitNotFound(habit_id)),
    }
}

/// Check a habit for `date`.
///
/// Awards experience, refreshes streaks, issues the reward boxes the check
/// earned and unlocks achievements. Checking the same habit twice on a day
/// returns `AlreadyChecked` and changes nothing.
///
/// The check, the progress update and the box issuance commit together; an
/// error anywhere rolls all of them back.
pub async fn check_habit(
    state: &AppState,
    user_id: &str,
    habit_id: i64,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<CheckOutcome> {
    let habit = owned_habit(state, user_id, habit_id).await?;
    if !habit.is_active {
        return Err(Error::InvalidArgument(format!("habit {} is archived", habit_id)));
    }
    let config = state.progression_config().await;

    let mut tx = state
        .db
        .pool()
        .begin()
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    // Recording the check is the first statement so the transaction takes
    // the write lock before it reads progress
    if sqlite::record_check(&mut *tx, habit_id, user_id, date, now).await?.is_none() {
        debug!(user_id, habit_id, %date, "habit already checked");
        return Ok(CheckOutcome::AlreadyChecked { habit_id, date });
    }

    let streak = daily_streak(&mut tx, user_id, date).await?;
    let weekly = weekly_streak(&mut tx, user_id, date).await?;

    let mut record = sqlite::get_or_create_progress(&mut *tx, user_id).await?;
    let previous_level = record.level;
    let previous_streak = record.current_streak;

    let gain = apply_experience(&config, record.experience, record.level, streak, config.habit_check_exp)?;
    record.experience = gain.new_exp;
    record.level = gain.new_level;
    record.current_streak = streak;
    record.weekly_target_streak = weekly;
    sqlite::save_progress(&mut *tx, &record).await?;

    let boxes_issued = issue_earned_boxes(&mut tx, user_id, &habit, date, streak, now).await?;
    tx.commit().await.map_err(|e| Error::DatabaseError(e.to_string()))?;

    info!(
        user_id,
        habit_id,
        %date,
        exp = gain.new_exp,
        awarded = gain.total_awarded,
        level = gain.new_level,
        streak,
        boxes = boxes_issued.len(),
        "habit checked"
    );

    if gain.leveled_up(previous_level) {
        state.notifications.notify_level_up(gain.new_level).await;
    }
    if streak != previous_streak && config.is_milestone(streak) {
        state.notifications.notify_streak_milestone(streak).await;
    }
    for reward_box in &boxes_issued {
        state.notifications.notify_box_issued(reward_box).await;
    }

    let achievements_unlocked = refresh_achievements(state, user_id, date, now).await?;

    Ok(CheckOutcome::Checked(CheckSummary {
        habit_id,
        date,
        gain,
        previous_level,
        current_streak: streak,
        weekly_target_streak: weekly,
        boxes_issued,
        achievements_unlocked,
    }))
}

/// Issue the daily, weekly and monthly boxes a check has earned, each at
/// most once per period
async fn issue_earned_boxes(
    conn: &mut SqliteConnection,
    user_id: &str,
    habit: &Habit,
    date: NaiveDate,
    streak: u32,
    now: DateTime<Utc>,
) -> Result<Vec<RewardBox>> {
    let mut issued = Vec::new();

    // daily: every active daily habit done today
    let daily_habits = sqlite::list_habits(&mut *conn, user_id, false)
        .await?
        .iter()
        .filter(|h| h.frequency == HabitFrequency::Daily)
        .count();
    if daily_habits > 0 {
        let done = sqlite::daily_completions(&mut *conn, user_id, date)
            .await?
            .get(&date)
            .copied()
            .unwrap_or(0);
        if done >= daily_habits {
            let key = date.format("%Y-%m-%d").to_string();
            issued.extend(sqlite::issue_reward_box(&mut *conn, user_id, BoxTier::Daily, &key, now).await?);
        }
    }

    // weekly: this habit reached its weekly target
    if habit.frequency == HabitFrequency::Weekly {
        let monday = week_start(date);
        let checks = sqlite::count_checks_between(&mut *conn, habit.id, monday, monday + Duration::days(6)).await?;
        if checks >= habit.weekly_target {
            let week = date.iso_week();
            let key = format!("{}-W{:02}", week.year(), week.week());
            issued.extend(sqlite::issue_reward_box(&mut *conn, user_id, BoxTier::Weekly, &key, now).await?);
        }
    }

    // monthly: streak of 30 days or more
    if streak >= MONTHLY_STREAK_DAYS {
        let key = date.format("%Y-%m").to_string();
        issued.extend(sqlite::issue_reward_box(&mut *conn, user_id, BoxTier::Monthly, &key, now).await?);
    }

    Ok(issued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{list_boxes, set_progression_config};
    use crate::Notification;
    use chrono::TimeZone;
    use lootinyang_core::ProgressRecord;
    use lootinyang_engine::ProgressionConfig;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn at(date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(20, 0, 0).unwrap())
    }

    async fn checked(state: &AppState, habit_id: i64, date: NaiveDate) -> CheckSummary {
        match check_habit(state, "u1", habit_id, date, at(date)).await.unwrap() {
            CheckOutcome::Checked(summary) => summary,
            other => panic!("expected Checked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_habit_unlocks_achievement() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, unlocked) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 4)))
            .await
            .unwrap();
        assert_eq!(habit.name, "Feed cat");
        let ids: Vec<_> = unlocked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["create_first_habit"]);

        let (_, again) = create_habit(&state, "u1", NewHabit::daily("Brush cat"), at(day(3, 4)))
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_check_awards_exp_and_daily_box() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 4))).await.unwrap();

        let summary = checked(&state, habit.id, day(3, 4)).await;
        assert_eq!(summary.gain.total_awarded, 10);
        assert_eq!(summary.gain.new_exp, 10);
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.boxes_issued.len(), 1);
        assert_eq!(summary.boxes_issued[0].tier, BoxTier::Daily);

        let recent = state.notifications.recent().await;
        assert!(recent.iter().any(|n| matches!(n, Notification::RewardBoxIssued { tier, .. } if tier == "daily")));
    }

    #[tokio::test]
    async fn test_second_check_same_day_changes_nothing() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 4))).await.unwrap();
        checked(&state, habit.id, day(3, 4)).await;

        let again = check_habit(&state, "u1", habit.id, day(3, 4), at(day(3, 4))).await.unwrap();
        assert!(matches!(again, CheckOutcome::AlreadyChecked { .. }));
        assert!(again.summary().is_none());

        let record = sqlite::get_progress(state.db.pool(), "u1").await.unwrap().unwrap();
        assert_eq!(record.experience, 10);
        assert_eq!(list_boxes(&state, "u1", false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_daily_box_waits_for_all_daily_habits() {
        let state = AppState::in_memory().await.unwrap();
        let (feed, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 4))).await.unwrap();
        let (play, _) = create_habit(&state, "u1", NewHabit::daily("Play"), at(day(3, 4))).await.unwrap();

        assert!(checked(&state, feed.id, day(3, 4)).await.boxes_issued.is_empty());
        let second = checked(&state, play.id, day(3, 4)).await;
        assert_eq!(second.boxes_issued.len(), 1);
        assert_eq!(second.current_streak, 1);
    }

    #[tokio::test]
    async fn test_weekly_box_once_per_week() {
        let state = AppState::in_memory().await.unwrap();
        let (gym, _) = create_habit(&state, "u1", NewHabit::weekly("Vet walk", 2), at(day(3, 4))).await.unwrap();

        // Monday 4 March 2024
        assert!(checked(&state, gym.id, day(3, 4)).await.boxes_issued.is_empty());
        let target = checked(&state, gym.id, day(3, 6)).await;
        assert_eq!(target.boxes_issued.len(), 1);
        assert_eq!(target.boxes_issued[0].tier, BoxTier::Weekly);
        assert_eq!(target.weekly_target_streak, 1);
        assert!(checked(&state, gym.id, day(3, 8)).await.boxes_issued.is_empty());

        // next week earns a new one
        checked(&state, gym.id, day(3, 11)).await;
        assert_eq!(checked(&state, gym.id, day(3, 12)).await.boxes_issued.len(), 1);
    }

    #[tokio::test]
    async fn test_streak_bonus_and_milestone() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 1))).await.unwrap();

        for d in 1..=6 {
            assert_eq!(checked(&state, habit.id, day(3, d)).await.gain.total_awarded, 10);
        }
        let seventh = checked(&state, habit.id, day(3, 7)).await;
        assert_eq!(seventh.current_streak, 7);
        assert_eq!(seventh.gain.total_awarded, 15);
        assert_eq!(seventh.gain.new_exp, 75);
        assert!(seventh.achievements_unlocked.iter().any(|a| a.id == "streak_7_days"));

        let recent = state.notifications.recent().await;
        assert!(recent.contains(&Notification::StreakMilestone { days: 7 }));
    }

    #[tokio::test]
    async fn test_missed_day_resets_streak() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 1))).await.unwrap();
        checked(&state, habit.id, day(3, 1)).await;
        checked(&state, habit.id, day(3, 2)).await;
        assert_eq!(checked(&state, habit.id, day(3, 4)).await.current_streak, 1);
    }

    #[tokio::test]
    async fn test_level_up_is_notified() {
        let state = AppState::in_memory().await.unwrap();
        let cfg = ProgressionConfig {
            exp_per_level: 20,
            ..ProgressionConfig::default()
        };
        set_progression_config(&state, cfg).await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 1))).await.unwrap();

        assert!(!checked(&state, habit.id, day(3, 1)).await.leveled_up());
        let second = checked(&state, habit.id, day(3, 2)).await;
        assert!(second.leveled_up());
        assert_eq!(second.gain.new_level, 2);
        assert!(state.notifications.recent().await.contains(&Notification::LevelUp { level: 2 }));
    }

    #[tokio::test]
    async fn test_monthly_box_at_thirty_days() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 1))).await.unwrap();

        for d in 1..=29 {
            let summary = checked(&state, habit.id, day(3, d)).await;
            assert!(summary.boxes_issued.iter().all(|b| b.tier == BoxTier::Daily));
        }
        let thirtieth = checked(&state, habit.id, day(3, 30)).await;
        assert!(thirtieth.boxes_issued.iter().any(|b| b.tier == BoxTier::Monthly));
        let next = checked(&state, habit.id, day(3, 31)).await;
        assert!(next.boxes_issued.iter().all(|b| b.tier != BoxTier::Monthly));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_keep_every_award() {
        let state = AppState::in_memory().await.unwrap();
        let mut habit_ids = Vec::new();
        for n in 0..8 {
            let name = format!("Chore {}", n);
            let (habit, _) = create_habit(&state, "u1", NewHabit::daily(&name), at(day(3, 4))).await.unwrap();
            habit_ids.push(habit.id);
        }

        let tasks: Vec<_> = habit_ids
            .into_iter()
            .map(|habit_id| {
                let state = state.clone();
                tokio::spawn(async move { check_habit(&state, "u1", habit_id, day(3, 4), at(day(3, 4))).await })
            })
            .collect();
        for task in tasks {
            assert!(matches!(task.await.unwrap().unwrap(), CheckOutcome::Checked(_)));
        }

        let record = sqlite::get_progress(state.db.pool(), "u1").await.unwrap().unwrap();
        assert_eq!(record.experience, 80);
        assert_eq!(record.current_streak, 1);
        let boxes = list_boxes(&state, "u1", false).await.unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].tier, BoxTier::Daily);
    }

    #[tokio::test]
    async fn test_failed_check_leaves_no_trace() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 4))).await.unwrap();
        let near_max = ProgressRecord {
            user_id: "u1".to_string(),
            level: 100,
            experience: i64::MAX - 5,
            current_streak: 0,
            weekly_target_streak: 0,
        };
        sqlite::save_progress(state.db.pool(), &near_max).await.unwrap();

        // a retry fails the same way instead of reporting AlreadyChecked
        for _ in 0..2 {
            let result = check_habit(&state, "u1", habit.id, day(3, 4), at(day(3, 4))).await;
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }

        assert!(sqlite::list_checks(state.db.pool(), "u1", day(3, 1)).await.unwrap().is_empty());
        assert!(list_boxes(&state, "u1", false).await.unwrap().is_empty());
        let record = sqlite::get_progress(state.db.pool(), "u1").await.unwrap().unwrap();
        assert_eq!(record.experience, i64::MAX - 5);
    }

    #[tokio::test]
    async fn test_foreign_and_archived_habits_rejected() {
        let state = AppState::in_memory().await.unwrap();
        let (habit, _) = create_habit(&state, "u1", NewHabit::daily("Feed cat"), at(day(3, 1))).await.unwrap();

        let foreign = check_habit(&state, "u2", habit.id, day(3, 1), at(day(3, 1))).await;
        assert!(matches!(foreign, Err(Error::HabitNotFound(_))));

        assert!(archive_habit(&state, "u1", habit.id).await.unwrap());
        let archived = check_habit(&state, "u1", habit.id, day(3, 1), at(day(3, 1))).await;
        assert!(matches!(archived, Err(Error::InvalidArgument(_))));
        assert!(list_habits(&state, "u1").await.unwrap().is_empty());
    }
}
