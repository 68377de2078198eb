//! File-backed implementation of the [`TokenStore`] port.
//!
//! The token lives in a small JSON document
//! (`{access_token, description, last_updated}`) at a fixed path. Saving
//! writes a temporary file in the same directory and renames it over the
//! target, so a reader never observes a half-written token. Read failures
//! degrade to "absent": a corrupt cache means "re-authenticate", never a
//! crash.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cems_app::ports::token_store::TokenStore;
use cems_domain::error::CemsError;
use cems_domain::time::{format_portal, now};
use cems_domain::token::AccessToken;

mod error;

pub use error::TokenFileError;

/// On-disk document shape.
#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    description: String,
    last_updated: String,
}

/// Token store backed by a JSON file at a fixed location.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store over the given cache file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(path: &Path, payload: &str) -> Result<(), TokenFileError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp.as_file(), payload.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    async fn load(&self) -> Option<AccessToken> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read token cache");
                return None;
            }
        };

        match serde_json::from_str::<CachedToken>(&raw) {
            Ok(cached) if !cached.access_token.is_empty() => {
                tracing::debug!(path = %self.path.display(), "loaded token from cache");
                Some(AccessToken::new(cached.access_token))
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "token cache is corrupt, ignoring");
                None
            }
        }
    }

    async fn save(&self, token: &AccessToken) -> Result<(), CemsError> {
        let document = CachedToken {
            access_token: token.as_str().to_string(),
            description: "emission portal access token".to_string(),
            last_updated: format_portal(now()),
        };
        let payload =
            serde_json::to_string_pretty(&document).map_err(TokenFileError::Serialize)?;
        let payload = payload + "\n";

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::write_atomic(&path, &payload))
            .await
            .map_err(|err| CemsError::storage(TokenFileError::Io(err.into())))?
            .map_err(CemsError::storage)?;

        tracing::info!(path = %self.path.display(), "token persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CemsError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "token cache cleared");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CemsError::storage(TokenFileError::Io(err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileTokenStore {
        FileTokenStore::new(dir.path().join("token_cache.json"))
    }

    #[tokio::test]
    async fn should_return_none_when_cache_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn should_round_trip_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&AccessToken::new("abc123")).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.as_str(), "abc123");
    }

    #[tokio::test]
    async fn should_write_expected_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&AccessToken::new("abc123")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["access_token"], "abc123");
        assert!(value["description"].is_string());
        assert!(value["last_updated"].is_string());
    }

    #[tokio::test]
    async fn should_overwrite_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&AccessToken::new("old")).await.unwrap();
        store.save(&AccessToken::new("new")).await.unwrap();
        assert_eq!(store.load().await.unwrap().as_str(), "new");
    }

    #[tokio::test]
    async fn should_treat_corrupt_cache_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn should_treat_empty_token_value_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{"access_token": "", "description": "", "last_updated": ""}"#,
        )
        .unwrap();

        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn should_clear_cache_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&AccessToken::new("abc")).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.is_none());
        // Clearing an already-empty cache is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn should_not_leave_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&AccessToken::new("abc")).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
