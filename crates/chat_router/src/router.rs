//! Router - the dispatch boundary between the transport and the features

use std::sync::Arc;

use chat_core::callback::{
    ACTION_BACK, ACTION_CANCEL, ACTION_COMMIT, ACTION_MAIN_MENU, ACTION_NO_ACTION,
    SECTION_DIALOG, SECTION_NAV,
};
use chat_core::{CallbackCodec, CallbackToken, Keyboard, NavigationFrame, RenderSpec, UserId};
use chat_state::{ConfirmChoice, DialogEvent, DialogKind};
use session_manager::{SessionStore, UserSession};

use crate::dialog::DialogRunner;
use crate::event::InboundEvent;
use crate::handler::{guarded, HandlerError, HandlerOutcome, TEXT_PARAM};
use crate::navigation::NavigationManager;
use crate::registry::HandlerRegistry;

const TEXT_HINT: &str = "Use the buttons below to choose a section.";
const NOTHING_TO_CANCEL: &str = "There is nothing to cancel.";

/// Routes every inbound event of every user.
///
/// Events for one user are serialized by the session lock; different users
/// proceed independently. Nothing a handler does, including panicking, is
/// propagated back to the caller.
#[derive(Debug)]
pub struct Router {
    registry: Arc<HandlerRegistry>,
    navigation: NavigationManager,
    dialogs: DialogRunner,
    sessions: Arc<SessionStore>,
}

impl Router {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        navigation: NavigationManager,
        dialogs: DialogRunner,
        sessions: Arc<SessionStore>,
    ) -> Self {
        tracing::info!(sections = ?registry.sections(), "router ready");
        Self {
            registry,
            navigation,
            dialogs,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn navigation(&self) -> &NavigationManager {
        &self.navigation
    }

    /// Handle one inbound event for `user`.
    pub async fn handle(&self, user: UserId, event: InboundEvent) {
        tracing::debug!(user_id = %user, kind = event.kind(), event = %event, "inbound event");
        let mut session = self.sessions.lock(user).await;
        session.touch();

        match event {
            InboundEvent::Callback(raw) => {
                let token = CallbackCodec::decode(&raw);
                self.dispatch_token(&mut session, token).await;
            }
            InboundEvent::Text(text) => self.handle_text(&mut session, text).await,
            InboundEvent::Command(name) => self.handle_command(&mut session, &name).await,
        }
    }

    /// Decode raw callback data and dispatch it.
    pub async fn dispatch(&self, user: UserId, raw: &str) {
        self.handle(user, InboundEvent::callback(raw)).await;
    }

    async fn dispatch_token(&self, session: &mut UserSession, token: CallbackToken) {
        if session.has_dialog() {
            self.dispatch_in_dialog(session, token).await;
            return;
        }

        if token.section == SECTION_DIALOG {
            // Controls of a dialog that has already ended, e.g. a double tap on "Save".
            tracing::debug!(user_id = %session.user_id, token = %token, "stale dialog control ignored");
            return;
        }

        if let Some(kind) = DialogKind::from_trigger(&token.section, &token.action) {
            self.navigation.start_dialog(session, kind).await;
            return;
        }

        self.run_handler(session, token).await;
    }

    async fn run_handler(&self, session: &mut UserSession, token: CallbackToken) {
        let Some(handler) = self.registry.get(&token.section) else {
            tracing::warn!(user_id = %session.user_id, section = %token.section, "unknown section");
            let message = format!("Unknown section: {}", token.section);
            self.navigation.show_error(session, &message).await;
            return;
        };

        let result = guarded(handler.handle_action(session.user_id, &token.action, &token.params)).await;
        match result {
            Ok(outcome) => self.apply(session, &token, outcome).await,
            Err(e) => self.fail(session, &token, e).await,
        }
    }

    async fn dispatch_in_dialog(&self, session: &mut UserSession, token: CallbackToken) {
        let navigation = &self.navigation;
        match (token.section.as_str(), token.action.as_str()) {
            (SECTION_DIALOG, ACTION_COMMIT) => {
                let event = DialogEvent::Choice(ConfirmChoice::Commit);
                self.dialogs.feed(navigation, session, event).await;
            }
            (SECTION_DIALOG, ACTION_CANCEL) | (SECTION_NAV, ACTION_BACK) => {
                self.dialogs.feed(navigation, session, DialogEvent::Cancel).await;
            }
            (SECTION_NAV, ACTION_MAIN_MENU) => navigation.go_to_main_menu(session).await,
            (SECTION_NAV, ACTION_NO_ACTION) => {}
            (section, action) => match DialogKind::from_trigger(section, action) {
                Some(kind) => navigation.start_dialog(session, kind).await,
                None => self.dialogs.reject(navigation, session).await,
            },
        }
    }

    async fn handle_text(&self, session: &mut UserSession, text: String) {
        if session.has_dialog() {
            self.dialogs
                .feed(&self.navigation, session, DialogEvent::Text(text))
                .await;
            return;
        }
        if let Some(target) = session.current.as_ref().and_then(NavigationFrame::text_target) {
            let token = target.with_param(TEXT_PARAM, text);
            self.run_handler(session, token).await;
            return;
        }
        let hint = RenderSpec::new(TEXT_HINT, Keyboard::main_menu_only());
        self.navigation.show_transient(session, hint).await;
    }

    async fn handle_command(&self, session: &mut UserSession, name: &str) {
        let navigation = &self.navigation;
        match name {
            "start" | "menu" => navigation.go_to_main_menu(session).await,
            "cancel" | "back" if session.has_dialog() => {
                self.dialogs.feed(navigation, session, DialogEvent::Cancel).await;
            }
            "back" => navigation.go_back(session).await,
            "cancel" => {
                let screen = RenderSpec::new(NOTHING_TO_CANCEL, Keyboard::main_menu_only());
                navigation.show_transient(session, screen).await;
            }
            other => {
                tracing::debug!(user_id = %session.user_id, command = other, "unknown command");
                if session.has_dialog() {
                    self.dialogs.reject(navigation, session).await;
                } else {
                    let screen = RenderSpec::new(
                        format!("Unknown command /{other}. {TEXT_HINT}"),
                        Keyboard::main_menu_only(),
                    );
                    navigation.show_transient(session, screen).await;
                }
            }
        }
    }

    async fn apply(&self, session: &mut UserSession, token: &CallbackToken, outcome: HandlerOutcome) {
        let navigation = &self.navigation;
        match outcome {
            HandlerOutcome::Show(render) => navigation.navigate_to(session, token, render).await,
            HandlerOutcome::Redirect(target, render) => {
                navigation.navigate_to(session, &target, render).await
            }
            HandlerOutcome::Back => navigation.go_back(session).await,
            HandlerOutcome::Home => navigation.go_to_main_menu(session).await,
            HandlerOutcome::Stay => {}
            HandlerOutcome::AwaitText { screen, reply_to } => {
                navigation.await_text(session, token, screen, reply_to).await
            }
        }
    }

    async fn fail(&self, session: &mut UserSession, token: &CallbackToken, error: HandlerError) {
        if error.is_internal() {
            tracing::error!(
                user_id = %session.user_id,
                section = %token.section,
                action = %token.action,
                "handler failed: {:#}",
                error
            );
        } else {
            tracing::warn!(
                user_id = %session.user_id,
                section = %token.section,
                action = %token.action,
                "request rejected: {}",
                error
            );
        }
        self.navigation
            .show_error(session, &error.user_message())
            .await;
    }
}
