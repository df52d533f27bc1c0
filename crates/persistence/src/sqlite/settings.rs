//! JSON values in the key/value settings table

use lootinyang_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

pub const PROGRESSION_CONFIG_KEY: &str = "progression_config";
pub const NOTIFICATION_CONFIG_KEY: &str = "notification_config";

/// Load a setting, `None` if it was never saved
pub async fn get_setting<T: DeserializeOwned>(pool: &SqlitePool, key: &str) -> Result<Option<T>> {
    let json = sqlx::query_scalar::<sqlx::Sqlite, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    match json {
        Some(j) => Ok(Some(serde_json::from_str(&j)?)),
        None => Ok(None),
    }
}

/// Save a setting as JSON
pub async fn set_setting<T: Serialize>(pool: &SqlitePool, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(&json)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}
