//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod browser;
pub mod data_client;
pub mod login;
pub mod storage;
pub mod token_provider;
pub mod token_store;

pub use browser::{BrowserSession, DragStep, Rect};
pub use data_client::{DataClient, FetchError};
pub use login::LoginAutomator;
pub use storage::ReadingRepository;
pub use token_provider::TokenProvider;
pub use token_store::TokenStore;
