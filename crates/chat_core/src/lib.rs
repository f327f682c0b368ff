//! chat_core - Core types for the chat front-end
//!
//! - `callback` - the `section:action:key=value` token codec
//! - `keyboard` - inline keyboards built from encoded tokens
//! - `frame` - navigation frames, render specs and user ids
//! - `config` - file and environment configuration

pub mod callback;
pub mod config;
pub mod frame;
pub mod keyboard;
pub mod paths;

// Re-export commonly used types
pub use callback::{CallbackCodec, CallbackToken, CodecError, Params};
pub use config::{Config, ConfigError};
pub use frame::{NavigationFrame, RenderSpec, UserId};
pub use keyboard::{Button, Keyboard};
