//! chatrelay webhook server.
//!
//! This crate wires the LINE webhook to the relay orchestrator and
//! exposes a health endpoint.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::{AppState, Relay};
