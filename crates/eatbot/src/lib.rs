//! eatbot - recipe and product browser on top of the chat router
//!
//! - `catalog` - JSON-backed recipe and product storage
//! - `handlers` - the `recipes` and `products` sections plus dialog committers
//! - `screens` - shared screen builders and parameter parsing
//! - `console` - a stdin/stdout transport
//! - `app` - router assembly

pub mod app;
pub mod catalog;
pub mod console;
pub mod handlers;
pub mod screens;

pub use app::build_router;
pub use console::ConsoleRenderer;
