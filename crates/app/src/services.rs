//! Application services built on the ports.

pub mod engine;
pub mod token_manager;

pub use engine::{CollectionEngine, EngineConfig};
pub use token_manager::TokenLifecycleManager;
