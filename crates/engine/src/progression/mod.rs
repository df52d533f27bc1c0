//! Experience, levels and streaks

mod streak;

pub use streak::{current_streak, week_start, weekly_target_met, weekly_target_streak};

use lootinyang_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunables for experience and levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionConfig {
    pub exp_per_level: i64,
    pub max_level: u32,
    /// Streak length at which the bonus multiplier applies
    pub streak_bonus_threshold: u32,
    pub streak_bonus_multiplier: f64,
    /// Base experience for one habit check
    pub habit_check_exp: i64,
    /// Streak lengths worth a notification
    pub streak_milestones: Vec<u32>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            exp_per_level: 100,
            max_level: 100,
            streak_bonus_threshold: 7,
            streak_bonus_multiplier: 1.5,
            habit_check_exp: 10,
            streak_milestones: vec![7, 30, 100],
        }
    }
}

impl ProgressionConfig {
    /// Level reached with `experience` total, capped at `max_level`
    pub fn level_for(&self, experience: i64) -> u32 {
        let raw = experience.max(0) / self.exp_per_level.max(1) + 1;
        raw.min(self.max_level as i64) as u32
    }

    /// Experience earned for `base_exp` at the given streak
    pub fn award_for(&self, streak: u32, base_exp: i64) -> i64 {
        if streak >= self.streak_bonus_threshold {
            (base_exp as f64 * self.streak_bonus_multiplier).floor() as i64
        } else {
            base_exp
        }
    }

    /// Experience gathered inside the current level and the amount a full
    /// level takes; `(0, 0)` once `max_level` is reached
    pub fn level_progress(&self, experience: i64) -> (i64, i64) {
        if self.level_for(experience) >= self.max_level {
            return (0, 0);
        }
        let per_level = self.exp_per_level.max(1);
        (experience.max(0) % per_level, per_level)
    }

    pub fn is_milestone(&self, streak: u32) -> bool {
        self.streak_milestones.contains(&streak)
    }
}

/// Outcome of adding experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceGain {
    pub new_exp: i64,
    pub new_level: u32,
    pub total_awarded: i64,
}

impl ExperienceGain {
    pub fn leveled_up(&self, previous_level: u32) -> bool {
        self.new_level > previous_level
    }
}

/// Add `base_exp` (with streak bonus) to `current_exp` and derive the level.
///
/// Negative experience inputs and totals past `i64::MAX` are rejected. The
/// returned level never drops
/// below `current_level` (itself capped at `max_level`).
pub fn apply_experience(
    config: &ProgressionConfig,
    current_exp: i64,
    current_level: u32,
    current_streak: u32,
    base_exp: i64,
) -> Result<ExperienceGain> {
    if current_exp < 0 {
        return Err(Error::InvalidArgument(format!(
            "current experience must be non-negative, got {}",
            current_exp
        )));
    }
    if base_exp < 0 {
        return Err(Error::InvalidArgument(format!(
            "base experience must be non-negative, got {}",
            base_exp
        )));
    }

    let total_awarded = config.award_for(current_streak, base_exp);
    let new_exp = current_exp.checked_add(total_awarded).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "experience overflow: {} + {}",
            current_exp, total_awarded
        ))
    })?;
    let new_level = config
        .level_for(new_exp)
        .max(current_level.min(config.max_level));

    Ok(ExperienceGain {
        new_exp,
        new_level,
        total_awarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RandomSource, RngSource};

    #[test]
    fn test_streak_bonus_applies_at_threshold() {
        let cfg = ProgressionConfig::default();
        let with_bonus = apply_experience(&cfg, 0, 1, 7, 10).unwrap();
        assert_eq!(with_bonus.total_awarded, 15);
        assert_eq!(with_bonus.new_exp, 15);

        let without = apply_experience(&cfg, 0, 1, 6, 10).unwrap();
        assert_eq!(without.total_awarded, 10);
    }

    #[test]
    fn test_bonus_is_floored() {
        let cfg = ProgressionConfig::default();
        assert_eq!(apply_experience(&cfg, 0, 1, 10, 7).unwrap().total_awarded, 10);
    }

    #[test]
    fn test_level_up() {
        let cfg = ProgressionConfig::default();
        let gain = apply_experience(&cfg, 95, 1, 0, 10).unwrap();
        assert_eq!(gain.new_exp, 105);
        assert_eq!(gain.new_level, 2);
        assert!(gain.leveled_up(1));
        assert!(!gain.leveled_up(2));
    }

    #[test]
    fn test_level_is_capped() {
        let cfg = ProgressionConfig::default();
        let gain = apply_experience(&cfg, 1_000_000, 100, 0, 10).unwrap();
        assert_eq!(gain.new_level, 100);
        assert_eq!(cfg.level_progress(gain.new_exp), (0, 0));
    }

    #[test]
    fn test_custom_constants() {
        let cfg = ProgressionConfig {
            exp_per_level: 50,
            max_level: 5,
            streak_bonus_threshold: 3,
            streak_bonus_multiplier: 2.0,
            ..ProgressionConfig::default()
        };
        let gain = apply_experience(&cfg, 40, 1, 3, 10).unwrap();
        assert_eq!(gain.total_awarded, 20);
        assert_eq!(gain.new_level, 2);
        assert_eq!(cfg.level_for(10_000), 5);
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let cfg = ProgressionConfig::default();
        assert!(matches!(
            apply_experience(&cfg, 0, 1, 0, -5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            apply_experience(&cfg, -1, 1, 0, 5),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_experience_overflow_rejected() {
        let cfg = ProgressionConfig::default();
        assert!(matches!(
            apply_experience(&cfg, i64::MAX, cfg.max_level, 0, 1),
            Err(Error::InvalidArgument(_))
        ));
        // the streak bonus alone can push a near-max total over
        assert!(matches!(
            apply_experience(&cfg, i64::MAX - 12, cfg.max_level, 7, 10),
            Err(Error::InvalidArgument(_))
        ));
        let exact = apply_experience(&cfg, i64::MAX - 10, cfg.max_level, 0, 10).unwrap();
        assert_eq!(exact.new_exp, i64::MAX);
        assert_eq!(exact.new_level, cfg.max_level);
    }

    #[test]
    fn test_monotonic_over_random_inputs() {
        let cfg = ProgressionConfig::default();
        let mut rng = RngSource::seeded(99);
        for _ in 0..5_000 {
            let exp = (rng.next_f64() * 20_000.0) as i64;
            let level = cfg.level_for(exp);
            let streak = (rng.next_f64() * 40.0) as u32;
            let base = (rng.next_f64() * 500.0) as i64;
            let gain = apply_experience(&cfg, exp, level, streak, base).unwrap();
            assert!(gain.new_exp >= exp);
            assert!(gain.new_level >= level);
            assert!(gain.new_level <= cfg.max_level);
        }
    }

    #[test]
    fn test_level_progress() {
        let cfg = ProgressionConfig::default();
        assert_eq!(cfg.level_progress(250), (50, 100));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let cfg: ProgressionConfig = serde_json::from_str(r#"{"expPerLevel": 200}"#).unwrap();
        assert_eq!(cfg.exp_per_level, 200);
        assert_eq!(cfg.max_level, 100);
        assert_eq!(cfg.streak_milestones, vec![7, 30, 100]);
    }
}
