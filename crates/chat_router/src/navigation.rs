//! Navigation manager - applies screen transitions to a user session

use std::sync::Arc;

use chat_core::callback::{ACTION_ERROR, SECTION_NAV};
use chat_core::{CallbackToken, Keyboard, NavigationFrame, RenderSpec};
use chat_state::{DialogKind, Rejection};
use session_manager::{DialogSession, UserSession};

use crate::dialog::DialogOutcome;
use crate::render::Renderer;

/// Owns the home screen and the renderer. Every operation works on a
/// session the caller has already locked.
pub struct NavigationManager {
    renderer: Arc<dyn Renderer>,
    home: RenderSpec,
}

impl std::fmt::Debug for NavigationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationManager")
            .field("home", &self.home.text)
            .finish_non_exhaustive()
    }
}

impl NavigationManager {
    pub fn new(renderer: Arc<dyn Renderer>, home: RenderSpec) -> Self {
        Self { renderer, home }
    }

    pub fn home(&self) -> &RenderSpec {
        &self.home
    }

    pub fn home_frame(&self) -> NavigationFrame {
        NavigationFrame::home(self.home.clone())
    }

    /// Show a new screen, pushing the current one onto the stack.
    ///
    /// Navigating to the location already on screen replaces it without
    /// pushing, so a repeated delivery of the same token does not grow the
    /// history.
    pub async fn navigate_to(
        &self,
        session: &mut UserSession,
        token: &CallbackToken,
        render: RenderSpec,
    ) {
        self.enter(session, NavigationFrame::from_token(token, render)).await;
    }

    /// Like [`navigate_to`](Self::navigate_to), but free text typed while this
    /// screen is current goes to `reply_to` in the token's section.
    pub async fn await_text(
        &self,
        session: &mut UserSession,
        token: &CallbackToken,
        render: RenderSpec,
        reply_to: String,
    ) {
        let frame = NavigationFrame::from_token(token, render).with_reply_to(reply_to);
        self.enter(session, frame).await;
    }

    async fn enter(&self, session: &mut UserSession, frame: NavigationFrame) {
        match session.current.take() {
            Some(current) if current.same_location(&frame) => {
                tracing::debug!(user_id = %session.user_id, location = %frame.location(), "same location, not pushing");
            }
            Some(current) => {
                if let Some(evicted) = session.stack.push(current) {
                    tracing::debug!(user_id = %session.user_id, location = %evicted.location(), "history bound reached");
                }
            }
            None => {}
        }

        tracing::info!(user_id = %session.user_id, location = %frame.location(), depth = session.stack.len(), "navigate");
        self.render(session, &frame.render).await;
        session.current = Some(frame);
    }

    /// Return to the previous screen, or home when there is none.
    pub async fn go_back(&self, session: &mut UserSession) {
        match session.stack.pop() {
            Some(frame) => {
                tracing::info!(user_id = %session.user_id, location = %frame.location(), "back");
                self.render(session, &frame.render).await;
                session.current = Some(frame);
            }
            None => {
                tracing::debug!(user_id = %session.user_id, "back on empty history");
                self.go_to_main_menu(session).await;
            }
        }
    }

    /// Full reset: clear the history, drop any dialog and show home.
    pub async fn go_to_main_menu(&self, session: &mut UserSession) {
        if let Some(dialog) = session.dialog.take() {
            tracing::info!(user_id = %session.user_id, dialog = %dialog.kind(), "dialog abandoned by home reset");
        }
        session.stack.clear();

        let frame = self.home_frame();
        tracing::info!(user_id = %session.user_id, "main menu");
        self.render(session, &frame.render).await;
        session.current = Some(frame);
    }

    /// Enter a dialog and show its first prompt. The current screen becomes
    /// the return point. Entering the dialog that is already running
    /// restarts it and keeps the original return point.
    pub async fn start_dialog(&self, session: &mut UserSession, kind: DialogKind) {
        let return_point = match session.dialog.take() {
            Some(mut running) => {
                tracing::info!(
                    user_id = %session.user_id,
                    from = %running.kind(),
                    to = %kind,
                    "dialog re-entered"
                );
                running.take_return_point()
            }
            None => None,
        };

        let return_point = return_point
            .or_else(|| session.current.clone())
            .unwrap_or_else(|| self.home_frame());
        if session.current.is_none() {
            session.current = Some(return_point.clone());
        }

        let dialog = DialogSession::new(kind, return_point);
        tracing::info!(user_id = %session.user_id, dialog = %kind, id = %dialog.id, "dialog started");
        session.dialog = Some(dialog);
        self.render_prompt(session, None).await;
    }

    /// Show the active dialog's current prompt.
    pub async fn render_prompt(&self, session: &mut UserSession, rejection: Option<&Rejection>) {
        let prompt = match &session.dialog {
            Some(dialog) => dialog.machine().prompt(rejection),
            None => return,
        };
        self.render(session, &prompt).await;
    }

    /// Close the active dialog and restore its return point.
    ///
    /// Returns `false` without rendering anything when no dialog is open, so
    /// a second call for the same dialog is a no-op.
    pub async fn end_dialog(&self, session: &mut UserSession, outcome: DialogOutcome) -> bool {
        let Some(mut dialog) = session.dialog.take() else {
            tracing::debug!(user_id = %session.user_id, "end_dialog without an open dialog");
            return false;
        };
        let Some(return_point) = dialog.take_return_point() else {
            return false;
        };

        tracing::info!(
            user_id = %session.user_id,
            dialog = %dialog.kind(),
            outcome = outcome.label(),
            "dialog ended"
        );

        match &outcome {
            DialogOutcome::Committed(message) => {
                self.render(session, &RenderSpec::text(message.clone())).await;
            }
            DialogOutcome::Failed(message) => {
                self.render(session, &RenderSpec::text(format!("⚠️ {message}")))
                    .await;
            }
            DialogOutcome::Cancelled => {}
        }

        self.render(session, &return_point.render).await;
        session.current = Some(return_point);
        true
    }

    /// Show an error screen as a regular navigation step, so "back" returns
    /// to the screen the user was on.
    pub async fn show_error(&self, session: &mut UserSession, message: &str) {
        let token = CallbackToken::new(SECTION_NAV, ACTION_ERROR);
        let render = RenderSpec::new(format!("⚠️ {message}"), Keyboard::error());
        if session.current.is_none() {
            session.current = Some(self.home_frame());
        }
        self.navigate_to(session, &token, render).await;
    }

    /// Render without touching the history.
    pub async fn show_transient(&self, session: &mut UserSession, render: RenderSpec) {
        self.render(session, &render).await;
    }

    async fn render(&self, session: &UserSession, screen: &RenderSpec) {
        if let Err(e) = self.renderer.render(session.user_id, screen).await {
            if e.is_benign() {
                tracing::debug!(user_id = %session.user_id, "render skipped: {}", e);
            } else {
                tracing::warn!(user_id = %session.user_id, "render failed: {}", e);
            }
        }
    }
}
