//! Storage adapter error types.

use cems_domain::error::CemsError;

/// Errors specific to the `SQLite` storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Query or connection failure.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Migration failure during startup.
    #[error("database migration failed")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The entry carried no parseable slot timestamp.
    #[error("entry has no parseable `time` field")]
    MissingTimestamp,

    /// The raw entry snapshot could not be serialized.
    #[error("failed to serialize raw entry")]
    Serialize(#[from] serde_json::Error),
}

impl From<StorageError> for CemsError {
    fn from(err: StorageError) -> Self {
        CemsError::storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_missing_timestamp() {
        assert_eq!(
            StorageError::MissingTimestamp.to_string(),
            "entry has no parseable `time` field"
        );
    }

    #[test]
    fn should_convert_into_domain_storage_error() {
        let err: CemsError = StorageError::MissingTimestamp.into();
        assert!(matches!(err, CemsError::Storage(_)));
    }
}
