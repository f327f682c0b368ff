//! # Session Manager
//!
//! Per-user session state for the chat front-end: the current screen, a
//! bounded navigation history and the active dialog, if any. Sessions are
//! held in a process-wide store keyed by user id; nothing is shared between
//! users.

pub mod error;
pub mod session;
pub mod stack;
pub mod store;

// Re-exports
pub use error::SessionError;
pub use session::{DialogSession, UserSession};
pub use stack::NavigationStack;
pub use store::SessionStore;
