//! The portal data-query client.

use std::collections::HashMap;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, REFERER};
use serde::{Deserialize, Serialize};

use cems_app::ports::data_client::{DataClient, FetchError};
use cems_domain::device::Device;
use cems_domain::entry::Entry;
use cems_domain::report::ReportType;
use cems_domain::token::AccessToken;
use cems_domain::window::TimeWindow;

use crate::config::PortalConfig;

/// JSON body of a `dataQuery/list` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    port_type_id: &'a str,
    port_id: &'a str,
    start_time: String,
    end_time: String,
    data_type: &'a str,
    headers: &'a str,
    size: u32,
    index: u32,
    ps_id: &'a str,
}

/// JSON body of a `dataQuery/list` response.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Vec<HashMap<String, serde_json::Value>>,
}

/// Portal rows mix strings with bare numbers; everything becomes a raw
/// string, and JSON `null` becomes the unsettled sentinel.
fn coerce(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => cems_domain::entry::SENTINEL.to_string(),
        other => other.to_string(),
    }
}

/// Stateless HTTP client for the portal's query API.
pub struct PortalClient {
    http: reqwest::Client,
    config: PortalConfig,
}

impl PortalClient {
    /// Build a client with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] when the TLS backend
    /// cannot be initialized.
    pub fn new(config: PortalConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { http, config })
    }
}

impl DataClient for PortalClient {
    async fn fetch(
        &self,
        token: &AccessToken,
        device: &Device,
        window: TimeWindow,
        report_type: ReportType,
    ) -> Result<Vec<Entry>, FetchError> {
        let body = QueryBody {
            port_type_id: &self.config.port_type_id,
            port_id: &device.port_id,
            start_time: window.start_str(),
            end_time: window.end_str(),
            data_type: report_type.data_type_code(),
            headers: &self.config.projection,
            size: self.config.page_size,
            index: 1,
            ps_id: &self.config.ps_id,
        };

        let response = self
            .http
            .post(&self.config.query_url)
            .header(AUTHORIZATION, format!("bearer {}", token.as_str()))
            .header(REFERER, &self.config.referer)
            .json(&body)
            .send()
            .await
            .map_err(|err| FetchError::Transport(Box::new(err)))?;

        match response.status() {
            StatusCode::OK => {
                let parsed: QueryResponse = response
                    .json()
                    .await
                    .map_err(|err| FetchError::Transport(Box::new(err)))?;
                Ok(parsed
                    .data
                    .into_iter()
                    .map(|row| row.into_iter().map(|(k, v)| (k, coerce(v))).collect())
                    .collect())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!(
                    device = %device.name,
                    status = %response.status(),
                    "portal rejected the credential"
                );
                Err(FetchError::AuthRejected)
            }
            status => {
                tracing::warn!(device = %device.name, %status, "unexpected portal response");
                Err(FetchError::Status(status.as_u16()))
            }
        }
    }
}
