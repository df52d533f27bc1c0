//! Backup export and import

use crate::AppState;
use chrono::{DateTime, Utc};
use lootinyang_core::Result;
use lootinyang_persistence::{decode_backup, encode_backup, sqlite, BackupData};
use tracing::info;

/// Export all local data as a `LOOT-` string
pub async fn export_backup(state: &AppState, now: DateTime<Utc>) -> Result<String> {
    let data = sqlite::export_data(state.db.pool()).await?;
    let encoded = encode_backup(&data, now)?;
    info!(habits = data.habits.len(), bytes = encoded.len(), "backup exported");
    Ok(encoded)
}

/// Replace all local data with a `LOOT-` backup.
///
/// Nothing is written unless the whole backup decodes. Saved settings are
/// applied immediately.
pub async fn import_backup(state: &AppState, text: &str) -> Result<BackupData> {
    let envelope = decode_backup::<BackupData>(text)?;
    sqlite::import_data(state.db.pool(), &envelope.data).await?;
    state.reload_settings().await?;
    info!(exported_at = ?envelope.exported_at, "backup imported");
    Ok(envelope.data)
}
