//! Built-in `nav` section

use async_trait::async_trait;
use chat_core::callback::{
    ACTION_BACK, ACTION_ERROR, ACTION_MAIN_MENU, ACTION_NO_ACTION, RAW_KEY,
};
use chat_core::{Params, UserId};

use crate::handler::{Handler, HandlerError, HandlerOutcome};

/// Back, home, the inert pagination label and the decode error route.
#[derive(Debug, Default, Clone, Copy)]
pub struct NavHandler;

#[async_trait]
impl Handler for NavHandler {
    async fn handle_action(
        &self,
        _user: UserId,
        action: &str,
        params: &Params,
    ) -> Result<HandlerOutcome, HandlerError> {
        match action {
            ACTION_BACK => Ok(HandlerOutcome::Back),
            ACTION_MAIN_MENU => Ok(HandlerOutcome::Home),
            ACTION_NO_ACTION => Ok(HandlerOutcome::Stay),
            ACTION_ERROR => {
                let raw = params.get(RAW_KEY).map(String::as_str).unwrap_or("");
                Err(HandlerError::Invalid(format!("unrecognised button {raw:?}")))
            }
            other => Err(HandlerError::Invalid(format!("unknown navigation {other:?}"))),
        }
    }
}
