//! # cems-domain
//!
//! Pure domain model for the CEMS (continuous emission monitoring) collector.
//!
//! ## Responsibilities
//! - Foundational types: timestamps, error conventions, the opaque access token
//! - Define **Devices** (monitored boilers with their remote port identifiers)
//! - Define **Report types** (hourly cumulative, minute averaged, daily)
//! - Define **Time windows** with report-type-specific settlement delay
//! - Define **Entries** (raw rows from the vendor portal) and the settlement
//!   rule that decides whether a row may be stored
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod device;
pub mod entry;
pub mod error;
pub mod report;
pub mod time;
pub mod token;
pub mod window;
