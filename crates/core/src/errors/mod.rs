//! Error types and Result alias for Lootinyang

use thiserror::Error;

/// Main error type for the tracker and its reward engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid box tier: {0}")]
    InvalidTier(String),

    #[error("Invalid achievement condition: {0}")]
    InvalidCondition(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Item catalog has no {0} items to fall back on")]
    EmptyCatalog(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    #[error("Habit not found: {0}")]
    HabitNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_maps_to_invalid_data() {
        let err: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::InvalidTier("yearly".into()).to_string(),
            "Invalid box tier: yearly"
        );
        assert_eq!(
            Error::EmptyCatalog("common".into()).to_string(),
            "Item catalog has no common items to fall back on"
        );
    }
}
