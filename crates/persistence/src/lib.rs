//! Lootinyang Persistence - Local SQLite data layer and backup codec

pub mod backup;
pub mod sqlite;

pub use backup::{decode_backup, encode_backup, BackupData, BackupEnvelope, BACKUP_PREFIX, BACKUP_VERSION};
pub use sqlite::Database;
