//! # cemsd — CEMS collector daemon
//!
//! Composition root that wires all adapters together and runs the
//! collection engine.
//!
//! ## Responsibilities
//! - Parse configuration (`cems.toml`, env vars)
//! - Initialize logging
//! - Open the `SQLite` pool and run migrations
//! - Construct adapter implementations
//! - Construct application services, injecting adapters via port traits
//! - Acquire the initial access token, then run the engine forever
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use cems_adapter_login_webdriver::WebDriverLoginAutomator;
use cems_adapter_portal_http::PortalClient;
use cems_adapter_storage_sqlite::SqliteReadingRepository;
use cems_adapter_token_file::FileTokenStore;
use cems_app::services::engine::CollectionEngine;
use cems_app::services::token_manager::TokenLifecycleManager;
use cems_domain::device::DeviceRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load().context("loading cems.toml")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Storage
    let db = cems_adapter_storage_sqlite::Config {
        database_url: config.database.url.clone(),
    }
    .build()
    .await
    .context("opening the readings database")?;
    let store = SqliteReadingRepository::new(db.pool().clone());

    // Token lifecycle
    let tokens = TokenLifecycleManager::new(
        FileTokenStore::new(&config.token_cache.path),
        WebDriverLoginAutomator::new(config.login.clone()),
    );

    // Without a token the engine can never make progress; surface a broken
    // login or account right at startup instead of looping on it.
    if tokens.access_token(false).await.is_none() {
        anyhow::bail!("could not obtain an initial access token, check credentials and webdriver");
    }

    // Engine
    let client = PortalClient::new(config.portal.clone()).context("building the portal client")?;
    let devices = DeviceRegistry::new(config.device_pairs())?;
    tracing::info!(devices = devices.len(), "collection engine starting");

    let engine =
        CollectionEngine::with_config(tokens, client, store, devices, config.engine.engine_config());
    engine.run().await
}
