//! qbank-store — Question store implementations.
//!
//! Implements the `QuestionStore` trait over the question server's REST API,
//! loads qbank configuration, and provides an in-memory mock for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{create_store, load_config, load_config_from, QbankConfig};
pub use http::HttpStore;
pub use mock::MockStore;
