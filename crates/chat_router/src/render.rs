//! Rendering collaborator

use async_trait::async_trait;
use chat_core::{RenderSpec, UserId};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The transport refused an edit that would not change the message.
    #[error("message content unchanged")]
    Unchanged,

    #[error("transport error: {0}")]
    Transport(String),
}

impl RenderError {
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Displays a screen to a user. The only way the core talks to the transport.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, user: UserId, screen: &RenderSpec) -> Result<(), RenderError>;
}

/// Keeps every rendered screen in memory.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    screens: Mutex<Vec<(UserId, RenderSpec)>>,
    fail_with: Mutex<Option<RenderError>>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following render fail with `error` (the screen is still recorded).
    pub async fn fail_with(&self, error: Option<RenderError>) {
        *self.fail_with.lock().await = error;
    }

    pub async fn screens(&self) -> Vec<(UserId, RenderSpec)> {
        self.screens.lock().await.clone()
    }

    /// Screens shown to one user, oldest first.
    pub async fn screens_for(&self, user: UserId) -> Vec<RenderSpec> {
        self.screens
            .lock()
            .await
            .iter()
            .filter(|(id, _)| *id == user)
            .map(|(_, screen)| screen.clone())
            .collect()
    }

    pub async fn last(&self, user: UserId) -> Option<RenderSpec> {
        self.screens_for(user).await.pop()
    }

    pub async fn count(&self) -> usize {
        self.screens.lock().await.len()
    }

    pub async fn clear(&self) {
        self.screens.lock().await.clear();
    }
}

#[async_trait]
impl Renderer for MemoryRenderer {
    async fn render(&self, user: UserId, screen: &RenderSpec) -> Result<(), RenderError> {
        self.screens.lock().await.push((user, screen.clone()));
        match self.fail_with.lock().await.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
