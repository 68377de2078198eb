//! HTTP implementation of the [`DataClient`](cems_app::ports::data_client::DataClient) port.
//!
//! A stateless wrapper around the portal's `dataQuery/list` endpoint. The
//! client issues exactly one request per fetch and maps response codes onto
//! the port's failure taxonomy; retry decisions belong to the engine.

mod client;
mod config;

pub use client::PortalClient;
pub use config::PortalConfig;
