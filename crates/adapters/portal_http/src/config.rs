//! Portal client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Field projection requested from the portal: slot time, DCS stop status,
/// and the emission metrics in both cumulative and averaged variants.
pub const DEFAULT_PROJECTION: &str =
    "time,stop-stopDcsType,a00000-cou,a34013-avg,a21026-avg,a21002-avg,a21001-avg";

fn default_port_type_id() -> String {
    // Flue gas outlets.
    "port_type2".to_string()
}

fn default_page_size() -> u32 {
    50_000
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_projection() -> String {
    DEFAULT_PROJECTION.to_string()
}

fn default_user_agent() -> String {
    concat!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
        "(KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36"
    )
    .to_string()
}

/// Configuration for the portal data-query client.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Full URL of the `dataQuery/list` endpoint.
    pub query_url: String,
    /// Power-station identifier the portal scopes all queries to.
    pub ps_id: String,
    /// Referer sent with every query; the portal rejects requests that do
    /// not appear to come from its own query page.
    pub referer: String,
    /// Port-type discriminator.
    #[serde(default = "default_port_type_id")]
    pub port_type_id: String,
    /// Comma-joined field projection.
    #[serde(default = "default_projection")]
    pub projection: String,
    /// Maximum rows per response page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Browser user agent; must match the one the login flow uses.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl PortalConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fill_defaults_from_minimal_toml() {
        let toml = r"
            query_url = 'http://portal.example/dataQuery/list'
            ps_id = '259556ea'
            referer = 'http://portal.example/dataQuery'
        ";
        let config: PortalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.port_type_id, "port_type2");
        assert_eq!(config.page_size, 50_000);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(config.projection.starts_with("time,"));
        assert!(config.user_agent.contains("Mozilla"));
    }
}
