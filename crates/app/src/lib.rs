//! # cems-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `TokenStore` — durable cache for the portal access token
//!   - `ReadingRepository` — upsert and query stored readings
//!   - `DataClient` — the vendor's data-query endpoint
//!   - `BrowserSession` — browser primitives the login flow is written against
//!   - `LoginAutomator` — the full browser-driven login, yielding a token
//! - Provide the **services** built on those ports:
//!   - `TokenLifecycleManager` — the sole entry point for "give me a token"
//!   - `CollectionEngine` — backfill, minute sync, and the self-healing loop
//!
//! ## Dependency rule
//! Depends on `cems-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod ports;
pub mod services;
