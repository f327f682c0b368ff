//! chat_router - turns inbound chat events into screen transitions
//!
//! An inbound event is decoded, routed to the handler registered for its
//! section (or to the active dialog), and the outcome is applied to the
//! user's navigation history before the screen is handed to the renderer.

pub mod dialog;
pub mod event;
pub mod handler;
pub mod nav;
pub mod navigation;
pub mod registry;
pub mod render;
pub mod router;

pub use dialog::{DialogCommitter, DialogOutcome, DialogRunner};
pub use event::InboundEvent;
pub use handler::{Handler, HandlerError, HandlerOutcome, TEXT_PARAM};
pub use nav::NavHandler;
pub use navigation::NavigationManager;
pub use registry::HandlerRegistry;
pub use render::{MemoryRenderer, RenderError, Renderer};
pub use router::Router;
