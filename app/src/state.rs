//! Application state management

use crate::notifications::{NotificationConfig, NotificationHandle};
use lootinyang_core::Result;
use lootinyang_engine::ProgressionConfig;
use lootinyang_persistence::sqlite::{self, NOTIFICATION_CONFIG_KEY, PROGRESSION_CONFIG_KEY};
use lootinyang_persistence::Database;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub const DATABASE_FILE: &str = "lootinyang.db";

/// State shared by every command
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub data_dir: Option<PathBuf>,
    pub config: Arc<RwLock<ProgressionConfig>>,
    pub notifications: NotificationHandle,
}

impl AppState {
    /// Open (or create) the database under `data_dir` and load saved settings
    pub async fn open(data_dir: PathBuf) -> Result<Self> {
        let db = Database::connect(&data_dir.join(DATABASE_FILE)).await?;
        let state = Self::with_database(db, Some(data_dir)).await?;
        info!(data_dir = ?state.data_dir, "application state ready");
        Ok(state)
    }

    /// State over a throwaway in-memory database
    pub async fn in_memory() -> Result<Self> {
        let db = Database::connect_in_memory().await?;
        Self::with_database(db, None).await
    }

    async fn with_database(db: Database, data_dir: Option<PathBuf>) -> Result<Self> {
        let state = Self {
            db: Arc::new(db),
            data_dir,
            config: Arc::new(RwLock::new(ProgressionConfig::default())),
            notifications: NotificationHandle::new(),
        };
        state.reload_settings().await?;
        Ok(state)
    }

    /// Re-read saved configs from the settings table (defaults when absent)
    pub async fn reload_settings(&self) -> Result<()> {
        let progression: ProgressionConfig = sqlite::get_setting(self.db.pool(), PROGRESSION_CONFIG_KEY)
            .await?
            .unwrap_or_default();
        let notifications: NotificationConfig = sqlite::get_setting(self.db.pool(), NOTIFICATION_CONFIG_KEY)
            .await?
            .unwrap_or_default();

        *self.config.write().await = progression;
        self.notifications.set_config(notifications).await;
        Ok(())
    }

    /// Current progression tunables
    pub async fn progression_config(&self) -> ProgressionConfig {
        self.config.read().await.clone()
    }
}
