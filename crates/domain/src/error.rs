//! Common error type used across port boundaries.
//!
//! Each layer defines its own typed errors and converts them into
//! [`CemsError`] when crossing a port. Adapter-specific detail stays in the
//! adapter error; only the category crosses the boundary.

/// Top-level error for the collector workspace.
#[derive(Debug, thiserror::Error)]
pub enum CemsError {
    /// Configuration is structurally valid but semantically wrong.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Persistence failed (token cache or reading store).
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The browser-driven login flow failed.
    #[error("login automation error")]
    Login(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The remote portal could not be queried.
    #[error("portal client error")]
    Portal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CemsError {
    /// Wrap an adapter error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }

    /// Wrap an adapter error as a login failure.
    pub fn login<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Login(Box::new(err))
    }

    /// Wrap an adapter error as a portal failure.
    pub fn portal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Portal(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk is full")]
    struct DiskFull;

    #[test]
    fn should_display_config_error() {
        let err = CemsError::Config("no devices configured".to_string());
        assert_eq!(err.to_string(), "invalid configuration: no devices configured");
    }

    #[test]
    fn should_keep_source_when_wrapping_storage_error() {
        let err = CemsError::storage(DiskFull);
        assert_eq!(err.to_string(), "storage error");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "disk is full");
    }

    #[test]
    fn should_keep_source_when_wrapping_login_error() {
        let err = CemsError::login(DiskFull);
        assert!(matches!(err, CemsError::Login(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
