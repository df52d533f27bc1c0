//! Persisted app-wide settings

use crate::notifications::NotificationConfig;
use crate::AppState;
use lootinyang_core::{Error, Result};
use lootinyang_engine::ProgressionConfig;
use lootinyang_persistence::sqlite::{self, NOTIFICATION_CONFIG_KEY, PROGRESSION_CONFIG_KEY};

pub async fn get_progression_config(state: &AppState) -> ProgressionConfig {
    state.progression_config().await
}

/// Validate, persist and apply new progression tunables
pub async fn set_progression_config(state: &AppState, config: ProgressionConfig) -> Result<()> {
    if config.exp_per_level <= 0 {
        return Err(Error::InvalidArgument("expPerLevel must be positive".to_string()));
    }
    if config.max_level == 0 {
        return Err(Error::InvalidArgument("maxLevel must be at least 1".to_string()));
    }
    if config.habit_check_exp < 0 || config.streak_bonus_multiplier < 0.0 {
        return Err(Error::InvalidArgument(
            "experience settings must not be negative".to_string(),
        ));
    }

    sqlite::set_setting(state.db.pool(), PROGRESSION_CONFIG_KEY, &config).await?;
    *state.config.write().await = config;
    Ok(())
}

pub async fn get_notification_config(state: &AppState) -> NotificationConfig {
    state.notifications.get_config().await
}

pub async fn set_notification_config(state: &AppState, config: NotificationConfig) -> Result<()> {
    sqlite::set_setting(state.db.pool(), NOTIFICATION_CONFIG_KEY, &config).await?;
    state.notifications.set_config(config).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progression_config_survives_reload() {
        let state = AppState::in_memory().await.unwrap();
        let custom = ProgressionConfig {
            exp_per_level: 50,
            ..ProgressionConfig::default()
        };
        set_progression_config(&state, custom.clone()).await.unwrap();

        *state.config.write().await = ProgressionConfig::default();
        state.reload_settings().await.unwrap();
        assert_eq!(get_progression_config(&state).await, custom);
    }

    #[tokio::test]
    async fn test_invalid_progression_config_rejected() {
        let state = AppState::in_memory().await.unwrap();
        let bad = ProgressionConfig {
            exp_per_level: 0,
            ..ProgressionConfig::default()
        };
        assert!(matches!(
            set_progression_config(&state, bad).await,
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(get_progression_config(&state).await, ProgressionConfig::default());
    }

    #[tokio::test]
    async fn test_notification_config_applies() {
        let state = AppState::in_memory().await.unwrap();
        let quiet = NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        };
        set_notification_config(&state, quiet.clone()).await.unwrap();
        assert_eq!(get_notification_config(&state).await, quiet);
    }
}
