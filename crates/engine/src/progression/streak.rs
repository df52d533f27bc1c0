//! Daily streak and weekly-target streak calculation

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Consecutive fully-completed days ending today.
///
/// A day is complete when at least `active_habits` distinct habits were
/// checked on it (`completed` maps day to that count). An unfinished today
/// does not break the streak; counting then starts from yesterday.
pub fn current_streak(
    today: NaiveDate,
    active_habits: usize,
    completed: &HashMap<NaiveDate, usize>,
) -> u32 {
    if active_habits == 0 {
        return 0;
    }

    let is_complete = |day: NaiveDate| completed.get(&day).copied().unwrap_or(0) >= active_habits;

    let mut day = if is_complete(today) {
        today
    } else {
        match today.pred_opt() {
            Some(d) => d,
            None => return 0,
        }
    };

    let mut streak = 0;
    while is_complete(day) {
        streak += 1;
        day = match day.pred_opt() {
            Some(d) => d,
            None => break,
        };
    }
    streak
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn weekly_target_met(checks: u32, target: u32) -> bool {
    target > 0 && checks >= target
}

/// Consecutive successful weeks counting back from `current_week`.
///
/// `results` maps a week's Monday to whether every weekly target was met.
/// The current week only adds to the streak once it has succeeded; while it
/// is still open, counting starts from the week before.
pub fn weekly_target_streak(current_week: NaiveDate, results: &BTreeMap<NaiveDate, bool>) -> u32 {
    let succeeded = |week: NaiveDate| results.get(&week).copied().unwrap_or(false);

    let current_week = week_start(current_week);
    let mut streak = 0;
    if succeeded(current_week) {
        streak += 1;
    }

    let mut week = current_week - Duration::days(7);
    while succeeded(week) {
        streak += 1;
        week = week - Duration::days(7);
    }
    streak
}
