//! Backup export/import codec
//!
//! A backup is the literal prefix `LOOT-` followed by standard base64 of a
//! UTF-8 JSON envelope:
//!
//! ```text
//! {"version":"1.0","exportedAt":"2024-03-10T08:00:00Z","data":{...}}
//! ```
//!
//! Decoding rejects anything without the prefix, with a different version,
//! or whose `data` is not a JSON object.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use lootinyang_core::{Error, Habit, HabitCheck, ProgressRecord, Result, RewardBox, UserAchievement};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sqlite::RewardIssuance;

pub const BACKUP_PREFIX: &str = "LOOT-";
pub const BACKUP_VERSION: &str = "1.0";

/// Versioned container around the exported data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope<T> {
    pub version: String,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    pub data: T,
}

/// The full local data set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupData {
    pub progress: Vec<ProgressRecord>,
    pub habits: Vec<Habit>,
    pub habit_checks: Vec<HabitCheck>,
    pub reward_boxes: Vec<RewardBox>,
    pub reward_issuance: Vec<RewardIssuance>,
    pub user_achievements: Vec<UserAchievement>,
    pub settings: BTreeMap<String, serde_json::Value>,
}

/// Encode `data` as a `LOOT-` backup string
pub fn encode_backup<T: Serialize>(data: &T, exported_at: DateTime<Utc>) -> Result<String> {
    let envelope = BackupEnvelope {
        version: BACKUP_VERSION.to_string(),
        exported_at: Some(exported_at),
        data,
    };
    let json = serde_json::to_string(&envelope)?;
    Ok(format!("{}{}", BACKUP_PREFIX, STANDARD.encode(json.as_bytes())))
}

/// Decode and validate a `LOOT-` backup string
pub fn decode_backup<T: DeserializeOwned>(text: &str) -> Result<BackupEnvelope<T>> {
    let payload = text
        .trim()
        .strip_prefix(BACKUP_PREFIX)
        .ok_or_else(|| Error::InvalidBackup(format!("missing {} prefix", BACKUP_PREFIX)))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| Error::InvalidBackup(format!("payload is not base64: {}", e)))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| Error::InvalidBackup(format!("payload is not UTF-8: {}", e)))?;
    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| Error::InvalidBackup(format!("payload is not JSON: {}", e)))?;

    match value.get("version").and_then(|v| v.as_str()) {
        Some(BACKUP_VERSION) => {}
        Some(other) => {
            return Err(Error::InvalidBackup(format!("unsupported version {}", other)));
        }
        None => return Err(Error::InvalidBackup("missing version".to_string())),
    }

    if !value.get("data").is_some_and(|d| d.is_object()) {
        return Err(Error::InvalidBackup("data must be an object".to_string()));
    }

    serde_json::from_value(value).map_err(|e| Error::InvalidBackup(e.to_string()))
}
