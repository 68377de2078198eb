//! Data-client port — the vendor's data-query endpoint.

use std::future::Future;

use cems_domain::device::Device;
use cems_domain::entry::Entry;
use cems_domain::report::ReportType;
use cems_domain::token::AccessToken;
use cems_domain::window::TimeWindow;

/// Why a fetch failed.
///
/// The client never retries on its own; the engine decides. Only
/// [`AuthRejected`](Self::AuthRejected) may trigger a forced token refresh —
/// every other failure is transient and handled by the next scheduled pass.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The portal answered 401 or 403 — the credential is likely dead.
    #[error("portal rejected the access token")]
    AuthRejected,

    /// The portal answered with an unexpected status code.
    #[error("portal returned unexpected status {0}")]
    Status(u16),

    /// The request never produced a usable response.
    #[error("portal request failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Stateless client for the portal's query API.
pub trait DataClient: Send + Sync {
    /// Fetch all rows for a device and time window at the given granularity.
    ///
    /// A `200` with an empty data list is a successful, empty fetch — "no
    /// data yet", not an error.
    fn fetch(
        &self,
        token: &AccessToken,
        device: &Device,
        window: TimeWindow,
        report_type: ReportType,
    ) -> impl Future<Output = Result<Vec<Entry>, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_auth_rejection() {
        assert_eq!(
            FetchError::AuthRejected.to_string(),
            "portal rejected the access token"
        );
    }

    #[test]
    fn should_display_unexpected_status() {
        assert_eq!(
            FetchError::Status(502).to_string(),
            "portal returned unexpected status 502"
        );
    }
}
