//! Habit and habit-check CRUD operations

use chrono::{DateTime, NaiveDate, Utc};
use lootinyang_core::{Error, Habit, HabitCheck, HabitFrequency, NewHabit, Result};
use sqlx::{Executor, Sqlite};
use std::collections::HashMap;

/// Database row for habit
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct HabitRow {
    id: i64,
    user_id: String,
    name: String,
    description: String,
    icon: String,
    frequency: String,
    weekly_target: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<HabitRow> for Habit {
    type Error = Error;

    fn try_from(row: HabitRow) -> Result<Self> {
        Ok(Habit {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            icon: row.icon,
            frequency: row.frequency.parse()?,
            weekly_target: row.weekly_target.max(0) as u32,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

/// Database row for a habit check
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct HabitCheckRow {
    id: i64,
    habit_id: i64,
    user_id: String,
    check_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<HabitCheckRow> for HabitCheck {
    fn from(row: HabitCheckRow) -> Self {
        HabitCheck {
            id: row.id,
            habit_id: row.habit_id,
            user_id: row.user_id,
            check_date: row.check_date,
            created_at: row.created_at,
        }
    }
}

pub(crate) const HABIT_COLUMNS: &str =
    "id, user_id, name, description, icon, frequency, weekly_target, is_active, created_at";

fn validate_new_habit(habit: &NewHabit) -> Result<()> {
    if habit.name.trim().is_empty() {
        return Err(Error::InvalidArgument("habit name must not be empty".to_string()));
    }
    if habit.frequency == HabitFrequency::Weekly && !(1..=7).contains(&habit.weekly_target) {
        return Err(Error::InvalidArgument(format!(
            "weekly target must be between 1 and 7, got {}",
            habit.weekly_target
        )));
    }
    Ok(())
}

/// Create a new habit
pub async fn create_habit<'e, E>(
    executor: E,
    user_id: &str,
    habit: &NewHabit,
    created_at: DateTime<Utc>,
) -> Result<Habit>
where
    E: Executor<'e, Database = Sqlite>,
{
    validate_new_habit(habit)?;

    let weekly_target = match habit.frequency {
        HabitFrequency::Daily => 0,
        HabitFrequency::Weekly => habit.weekly_target,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO habits (user_id, name, description, icon, frequency, weekly_target, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(user_id)
    .bind(habit.name.trim())
    .bind(&habit.description)
    .bind(&habit.icon)
    .bind(habit.frequency.as_str())
    .bind(weekly_target as i64)
    .bind(created_at)
    .execute(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(Habit {
        id: result.last_insert_rowid(),
        user_id: user_id.to_string(),
        name: habit.name.trim().to_string(),
        description: habit.description.clone(),
        icon: habit.icon.clone(),
        frequency: habit.frequency,
        weekly_target,
        is_active: true,
        created_at,
    })
}

/// Get a habit by ID
pub async fn get_habit<'e, E>(executor: E, id: i64) -> Result<Option<Habit>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<HabitRow> =
        sqlx::query_as(&format!("SELECT {} FROM habits WHERE id = ?", HABIT_COLUMNS))
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(Habit::try_from).transpose()
}

/// List a user's habits, oldest first
pub async fn list_habits<'e, E>(executor: E, user_id: &str, include_archived: bool) -> Result<Vec<Habit>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = if include_archived {
        format!("SELECT {} FROM habits WHERE user_id = ? ORDER BY id", HABIT_COLUMNS)
    } else {
        format!(
            "SELECT {} FROM habits WHERE user_id = ? AND is_active = 1 ORDER BY id",
            HABIT_COLUMNS
        )
    };

    let rows: Vec<HabitRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .fetch_all(executor)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter().map(Habit::try_from).collect()
}

/// Archive a habit. Its checks are kept. Returns false if no active habit matched.
pub async fn archive_habit<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE habits SET is_active = 0 WHERE id = ? AND is_active = 1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected() > 0)
}

/// Count a user's active habits
pub async fn count_active_habits<'e, E>(executor: E, user_id: &str) -> Result<u32>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM habits WHERE user_id = ? AND is_active = 1")
            .bind(user_id)
            .fetch_one(executor)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(count.0 as u32)
}

/// Record a check for a habit on a day.
///
/// Returns the new check id, or `None` if the habit was already checked on
/// that day.
pub async fn record_check<'e, E>(
    executor: E,
    habit_id: i64,
    user_id: &str,
    check_date: NaiveDate,
    created_at: DateTime<Utc>,
) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO habit_checks (habit_id, user_id, check_date, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(habit_id)
    .bind(user_id)
    .bind(check_date)
    .bind(created_at)
    .execute(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    if result.rows_affected() == 0 {
        Ok(None)
    } else {
        Ok(Some(result.last_insert_rowid()))
    }
}

/// List a user's checks on or after `since`, oldest first
pub async fn list_checks<'e, E>(executor: E, user_id: &str, since: NaiveDate) -> Result<Vec<HabitCheck>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows: Vec<HabitCheckRow> = sqlx::query_as(
        r#"
        SELECT id, habit_id, user_id, check_date, created_at
        FROM habit_checks
        WHERE user_id = ? AND check_date >= ?
        ORDER BY check_date, id
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(rows.into_iter().map(HabitCheck::from).collect())
}

/// Number of distinct active daily habits checked per day, from `since` on
pub async fn daily_completions<'e, E>(
    executor: E,
    user_id: &str,
    since: NaiveDate,
) -> Result<HashMap<NaiveDate, usize>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
        r#"
        SELECT c.check_date, COUNT(DISTINCT c.habit_id)
        FROM habit_checks c
        JOIN habits h ON h.id = c.habit_id
        WHERE c.user_id = ? AND c.check_date >= ?
          AND h.is_active = 1 AND h.frequency = 'daily'
        GROUP BY c.check_date
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|(day, count)| (day, count.max(0) as usize))
        .collect())
}

/// Count checks of one habit between two days, inclusive
pub async fn count_checks_between<'e, E>(
    executor: E,
    habit_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<u32>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM habit_checks WHERE habit_id = ? AND check_date >= ? AND check_date <= ?",
    )
    .bind(habit_id)
    .bind(from)
    .bind(to)
    .fetch_one(executor)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(count.0 as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::Database;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_habits() {
        let db = Database::connect_in_memory().await.unwrap();
        let pool = db.pool();

        let read = create_habit(pool, "u1", &NewHabit::daily("Read"), at()).await.unwrap();
        let gym = create_habit(pool, "u1", &NewHabit::weekly("Gym", 3), at()).await.unwrap();
        create_habit(pool, "u2", &NewHabit::daily("Walk"), at()).await.unwrap();

        let habits = list_habits(pool, "u1", false).await.unwrap();
        assert_eq!(habits, vec![read.clone(), gym.clone()]);
        assert_eq!(get_habit(pool, gym.id).await.unwrap(), Some(gym));
        assert_eq!(count_active_habits(pool, "u1").await.unwrap(), 2);

        assert!(archive_habit(pool, read.id).await.unwrap());
        assert!(!archive_habit(pool, read.id).await.unwrap());
        assert_eq!(count_active_habits(pool, "u1").await.unwrap(), 1);
        assert_eq!(list_habits(pool, "u1", true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_habits_rejected() {
        let db = Database::connect_in_memory().await.unwrap();
        let blank = create_habit(db.pool(), "u1", &NewHabit::daily("  "), at()).await;
        assert!(matches!(blank, Err(Error::InvalidArgument(_))));
        let no_target = create_habit(db.pool(), "u1", &NewHabit::weekly("Gym", 0), at()).await;
        assert!(matches!(no_target, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_check_once_per_day() {
        let db = Database::connect_in_memory().await.unwrap();
        let pool = db.pool();
        let habit = create_habit(pool, "u1", &NewHabit::daily("Read"), at()).await.unwrap();

        assert!(record_check(pool, habit.id, "u1", day(10), at()).await.unwrap().is_some());
        assert!(record_check(pool, habit.id, "u1", day(10), at()).await.unwrap().is_none());
        assert!(record_check(pool, habit.id, "u1", day(11), at()).await.unwrap().is_some());

        let checks = list_checks(pool, "u1", day(1)).await.unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].check_date, day(10));
        assert_eq!(count_checks_between(pool, habit.id, day(11), day(17)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_daily_completions_ignore_weekly_and_archived() {
        let db = Database::connect_in_memory().await.unwrap();
        let pool = db.pool();
        let read = create_habit(pool, "u1", &NewHabit::daily("Read"), at()).await.unwrap();
        let walk = create_habit(pool, "u1", &NewHabit::daily("Walk"), at()).await.unwrap();
        let gym = create_habit(pool, "u1", &NewHabit::weekly("Gym", 2), at()).await.unwrap();
        let old = create_habit(pool, "u1", &NewHabit::daily("Old"), at()).await.unwrap();

        for habit in [&read, &walk, &gym, &old] {
            record_check(pool, habit.id, "u1", day(10), at()).await.unwrap();
        }
        record_check(pool, read.id, "u1", day(9), at()).await.unwrap();
        archive_habit(pool, old.id).await.unwrap();

        let done = daily_completions(pool, "u1", day(1)).await.unwrap();
        assert_eq!(done.get(&day(10)), Some(&2));
        assert_eq!(done.get(&day(9)), Some(&1));
    }
}
