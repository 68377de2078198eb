//! Token-provider port — "give me a usable token".
//!
//! Implemented by [`TokenLifecycleManager`](crate::services::token_manager::TokenLifecycleManager);
//! the engine depends on this trait so its retry behavior can be tested with
//! a counting fake.

use std::future::Future;

use cems_domain::token::AccessToken;

/// The engine's sole source of access tokens.
pub trait TokenProvider: Send + Sync {
    /// Return a usable token, or `None` when none can be obtained.
    ///
    /// With `force_refresh == false` a cached token is trusted and returned
    /// without any network validation. With `force_refresh == true` the
    /// cache is bypassed and a fresh login is performed.
    fn access_token(
        &self,
        force_refresh: bool,
    ) -> impl Future<Output = Option<AccessToken>> + Send;
}
