//! Feature handler contract

use std::any::Any;
use std::fmt::Debug;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use chat_core::{CallbackToken, CodecError, Params, RenderSpec, UserId};
use futures::FutureExt;
use thiserror::Error;

/// Expected failures are `NotFound` and `Invalid`. Only `Internal` is
/// treated as a bug and logged at error level.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A screen whose buttons do not fit the transport is a bug in the handler.
impl From<CodecError> for HandlerError {
    fn from(e: CodecError) -> Self {
        Self::Internal(anyhow::Error::new(e))
    }
}

impl HandlerError {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Text shown to the user. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) | Self::Invalid(_) => self.to_string(),
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Parameter carrying the free text a handler asked for.
pub const TEXT_PARAM: &str = "text";

/// What the router should do with the handler's result.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// Show this screen at the dispatched location.
    Show(RenderSpec),
    /// Show this screen at a different location.
    Redirect(CallbackToken, RenderSpec),
    Back,
    Home,
    /// Leave the screen as it is.
    Stay,
    /// Show this screen and deliver the user's next free text to `reply_to`
    /// in the same section, under [`TEXT_PARAM`].
    AwaitText { screen: RenderSpec, reply_to: String },
}

/// A feature module reachable through one callback section.
#[async_trait]
pub trait Handler: Debug + Send + Sync {
    async fn handle_action(
        &self,
        user: UserId,
        action: &str,
        params: &Params,
    ) -> Result<HandlerOutcome, HandlerError>;
}

/// Run a handler future, turning a panic into `HandlerError::Internal`.
pub(crate) async fn guarded<T, F>(future: F) -> Result<T, HandlerError>
where
    F: Future<Output = Result<T, HandlerError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(HandlerError::Internal(anyhow::anyhow!(
            "handler panicked: {}",
            panic_message(&*panic)
        ))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
