//! Dialog runner - feeds events to the active dialog and closes it

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::UserId;
use chat_state::{DialogEvent, DialogKind, DialogSubmission, Rejection, StepOutcome};
use session_manager::UserSession;

use crate::handler::{guarded, HandlerError};
use crate::navigation::NavigationManager;

/// How a dialog ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Confirmation text from the business-logic collaborator.
    Committed(String),
    Cancelled,
    /// Error text shown before the return point.
    Failed(String),
}

impl DialogOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Committed(_) => "committed",
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
        }
    }
}

/// Business-logic side of a confirmed dialog.
#[async_trait]
pub trait DialogCommitter: Debug + Send + Sync {
    /// Persist the submission and return the confirmation text.
    async fn commit(&self, user: UserId, submission: DialogSubmission)
        -> Result<String, HandlerError>;
}

/// Drives the active dialog of a session.
#[derive(Debug, Default)]
pub struct DialogRunner {
    committers: HashMap<DialogKind, Arc<dyn DialogCommitter>>,
}

impl DialogRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: DialogKind, committer: Arc<dyn DialogCommitter>) {
        if self.committers.insert(kind, committer).is_some() {
            tracing::warn!(dialog = %kind, "committer re-registered, last registration wins");
        }
    }

    pub fn with(mut self, kind: DialogKind, committer: Arc<dyn DialogCommitter>) -> Self {
        self.register(kind, committer);
        self
    }

    /// Feed one event and apply the outcome: re-prompt, next prompt, or end.
    pub async fn feed(
        &self,
        navigation: &NavigationManager,
        session: &mut UserSession,
        event: DialogEvent,
    ) {
        let user = session.user_id;
        let outcome = match session.feed_dialog(event) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(user_id = %user, "dialog transition failed: {}", e);
                navigation
                    .end_dialog(session, DialogOutcome::Failed(e.to_string()))
                    .await;
                return;
            }
        };

        match outcome {
            StepOutcome::Advanced { from, to } => {
                tracing::debug!(user_id = %user, %from, %to, "dialog advanced");
                navigation.render_prompt(session, None).await;
            }
            StepOutcome::Rejected { step, reason } => {
                tracing::debug!(user_id = %user, %step, "dialog input rejected: {}", reason);
                navigation.render_prompt(session, Some(&reason)).await;
            }
            StepOutcome::Cancelled => {
                navigation.end_dialog(session, DialogOutcome::Cancelled).await;
            }
            StepOutcome::Committed(submission) => {
                let outcome = match self.commit(user, submission).await {
                    Ok(message) => DialogOutcome::Committed(message),
                    Err(e) => {
                        tracing::error!(user_id = %user, "dialog commit failed: {}", e);
                        DialogOutcome::Failed(e.user_message())
                    }
                };
                navigation.end_dialog(session, outcome).await;
            }
        }
    }

    /// Re-prompt after input the current step cannot take.
    pub async fn reject(&self, navigation: &NavigationManager, session: &mut UserSession) {
        let Some(dialog) = &session.dialog else {
            return;
        };
        let rejection = Rejection::WrongInput {
            expected: dialog.machine().step().expects(),
        };
        tracing::debug!(user_id = %session.user_id, step = %dialog.machine().step(), "foreign input during dialog");
        navigation.render_prompt(session, Some(&rejection)).await;
    }

    async fn commit(
        &self,
        user: UserId,
        submission: DialogSubmission,
    ) -> Result<String, HandlerError> {
        let kind = submission.kind();
        let committer = self.committers.get(&kind).ok_or_else(|| {
            HandlerError::Internal(anyhow::anyhow!("no committer registered for {kind}"))
        })?;
        guarded(committer.commit(user, submission)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MemoryRenderer;
    use chat_core::{CallbackToken, RenderSpec};
    use chat_state::ConfirmChoice;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DialogCommitter for Counting {
        async fn commit(
            &self,
            _user: UserId,
            submission: DialogSubmission,
        ) -> Result<String, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match submission {
                DialogSubmission::Product(product) => Ok(format!("Saved {}", product.name)),
                DialogSubmission::Recipe(_) => Err(HandlerError::Invalid("wrong kind".into())),
            }
        }
    }

    async fn product_dialog() -> (NavigationManager, Arc<MemoryRenderer>, UserSession) {
        let renderer = Arc::new(MemoryRenderer::new());
        let navigation = NavigationManager::new(renderer.clone(), RenderSpec::text("home"));
        let mut session = UserSession::new(UserId(1), 10);
        navigation
            .navigate_to(
                &mut session,
                &CallbackToken::new("products", "menu"),
                RenderSpec::text("products"),
            )
            .await;
        navigation
            .start_dialog(&mut session, DialogKind::ProductCreation)
            .await;
        (navigation, renderer, session)
    }

    #[tokio::test]
    async fn test_full_product_dialog_commits_once() {
        let committer = Arc::new(Counting::default());
        let runner = DialogRunner::new().with(DialogKind::ProductCreation, committer.clone());
        let (navigation, renderer, mut session) = product_dialog().await;

        for input in ["Oats", "389", "16,9", "6.9", "66.3"] {
            runner
                .feed(&navigation, &mut session, DialogEvent::text(input))
                .await;
        }
        runner
            .feed(
                &navigation,
                &mut session,
                DialogEvent::Choice(ConfirmChoice::Commit),
            )
            .await;

        assert_eq!(committer.calls.load(Ordering::SeqCst), 1);
        assert!(session.dialog.is_none());
        assert_eq!(session.current.as_ref().unwrap().location(), "products:menu");

        let texts: Vec<String> = renderer
            .screens_for(UserId(1))
            .await
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert!(texts.contains(&"Saved Oats".to_string()));
        assert_eq!(texts.last().unwrap(), "products");
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts_same_step() {
        let runner = DialogRunner::new();
        let (navigation, renderer, mut session) = product_dialog().await;

        runner
            .feed(&navigation, &mut session, DialogEvent::text("x"))
            .await;

        let dialog = session.dialog.as_ref().unwrap();
        assert_eq!(dialog.machine().step().name(), "name");
        assert!(renderer.last(UserId(1)).await.unwrap().text.starts_with("❌"));
    }

    #[tokio::test]
    async fn test_missing_committer_fails_dialog_but_restores_screen() {
        let runner = DialogRunner::new();
        let (navigation, renderer, mut session) = product_dialog().await;

        for input in ["Oats", "389", "16.9", "6.9", "66.3"] {
            runner
                .feed(&navigation, &mut session, DialogEvent::text(input))
                .await;
        }
        runner
            .feed(
                &navigation,
                &mut session,
                DialogEvent::Choice(ConfirmChoice::Commit),
            )
            .await;

        assert!(session.dialog.is_none());
        assert_eq!(session.current.as_ref().unwrap().location(), "products:menu");
        let screens = renderer.screens_for(UserId(1)).await;
        let error = &screens[screens.len() - 2];
        assert!(error.text.starts_with("⚠️"));
    }

    #[tokio::test]
    async fn test_cancel_discards_and_returns() {
        let committer = Arc::new(Counting::default());
        let runner = DialogRunner::new().with(DialogKind::ProductCreation, committer.clone());
        let (navigation, _, mut session) = product_dialog().await;

        runner
            .feed(&navigation, &mut session, DialogEvent::text("Oats"))
            .await;
        runner
            .feed(&navigation, &mut session, DialogEvent::Cancel)
            .await;

        assert_eq!(committer.calls.load(Ordering::SeqCst), 0);
        assert!(session.dialog.is_none());
        assert_eq!(session.current.as_ref().unwrap().location(), "products:menu");
    }

    #[tokio::test]
    async fn test_foreign_input_is_rejected_with_hint() {
        let runner = DialogRunner::new();
        let (navigation, renderer, mut session) = product_dialog().await;

        runner.reject(&navigation, &mut session).await;
        let last = renderer.last(UserId(1)).await.unwrap();
        assert!(last.text.starts_with("❌ Please type"));
        assert!(session.dialog.is_some());
    }
}
