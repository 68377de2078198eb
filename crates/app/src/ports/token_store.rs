//! Token store port — durable cache for the portal access token.

use std::future::Future;

use cems_domain::error::CemsError;
use cems_domain::token::AccessToken;

/// Durable cache of the current access token.
///
/// Survives process restarts. Read failures degrade to "absent" (logged by
/// the implementation, never fatal): callers must treat absence as "must
/// re-authenticate". Writes must be atomic enough that a partially written
/// token is never returned as valid by a later [`load`](Self::load).
pub trait TokenStore: Send + Sync {
    /// Read the cached token, or `None` when absent or unreadable.
    fn load(&self) -> impl Future<Output = Option<AccessToken>> + Send;

    /// Persist a freshly acquired token.
    fn save(&self, token: &AccessToken) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Remove the cached token (e.g. when it is known to be dead).
    fn clear(&self) -> impl Future<Output = Result<(), CemsError>> + Send;
}
