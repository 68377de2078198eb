//! Login port — the full browser-driven login, yielding an access token.

use std::future::Future;

use cems_domain::error::CemsError;
use cems_domain::token::AccessToken;

/// Runs one complete login attempt against the portal.
///
/// An attempt either produces a whole, usable token or a typed failure —
/// never a partial one. Implementations must release any browser resource on
/// every exit path. Retrying a failed attempt is the caller's decision.
pub trait LoginAutomator: Send + Sync {
    /// Drive the login flow once and extract the resulting token.
    fn acquire_token(&self) -> impl Future<Output = Result<AccessToken, CemsError>> + Send;
}
