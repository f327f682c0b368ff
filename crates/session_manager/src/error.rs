//! Session manager error types

use chat_state::TransitionError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No active dialog")]
    NoActiveDialog,

    #[error("Dialog transition failed: {0}")]
    Transition(#[from] TransitionError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
