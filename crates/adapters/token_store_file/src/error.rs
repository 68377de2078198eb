//! Token file store error types.

use cems_domain::error::CemsError;

/// Errors specific to the file-backed token store.
#[derive(Debug, thiserror::Error)]
pub enum TokenFileError {
    /// Reading, writing, or renaming the cache file failed.
    #[error("token cache IO failed")]
    Io(#[from] std::io::Error),

    /// The token document could not be serialized.
    #[error("token cache serialization failed")]
    Serialize(#[from] serde_json::Error),
}

impl From<TokenFileError> for CemsError {
    fn from(err: TokenFileError) -> Self {
        CemsError::storage(err)
    }
}
