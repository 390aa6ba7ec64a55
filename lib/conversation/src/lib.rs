//! Conversation state for chatrelay.
//!
//! This crate provides:
//!
//! - **Session Store**: per-user dialogue state held in memory
//! - **Expiry Tracker**: last-activity bookkeeping and idle-session sweeps
//! - **History Policy**: system-turn placement and length trimming

pub mod error;
pub mod expiry;
pub mod history;
pub mod message;
pub mod session;

pub use error::HistoryPolicyError;
pub use expiry::ExpiryTracker;
pub use history::{History, HistoryPolicy};
pub use message::{Role, Turn};
pub use session::{Session, SessionStore};
