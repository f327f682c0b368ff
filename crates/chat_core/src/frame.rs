//! Navigation frames - snapshots of what a user is looking at

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::callback::{CallbackToken, Params, ACTION_MAIN_MENU, SECTION_NAV};
use crate::keyboard::Keyboard;

/// Identifies a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Text plus keyboard: everything needed to draw a screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSpec {
    pub text: String,
    #[serde(default)]
    pub keyboard: Keyboard,
}

impl RenderSpec {
    pub fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, Keyboard::empty())
    }
}

/// An immutable record of a rendered screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationFrame {
    pub section: String,
    pub action: String,
    #[serde(default)]
    pub params: Params,
    pub render: RenderSpec,
    /// Action in the same section that receives free text typed on this screen.
    #[serde(default)]
    pub reply_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NavigationFrame {
    pub fn new(
        section: impl Into<String>,
        action: impl Into<String>,
        params: Params,
        render: RenderSpec,
    ) -> Self {
        Self {
            section: section.into(),
            action: action.into(),
            params,
            render,
            reply_to: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_reply_to(mut self, action: impl Into<String>) -> Self {
        self.reply_to = Some(action.into());
        self
    }

    /// Token that free text typed on this screen is delivered to.
    pub fn text_target(&self) -> Option<CallbackToken> {
        self.reply_to
            .as_ref()
            .map(|action| CallbackToken::new(self.section.clone(), action.clone()))
    }

    pub fn from_token(token: &CallbackToken, render: RenderSpec) -> Self {
        Self::new(
            token.section.clone(),
            token.action.clone(),
            token.params.clone(),
            render,
        )
    }

    /// The fixed home frame.
    pub fn home(render: RenderSpec) -> Self {
        Self::new(SECTION_NAV, ACTION_MAIN_MENU, Params::new(), render)
    }

    pub fn is_home(&self) -> bool {
        self.section == SECTION_NAV && self.action == ACTION_MAIN_MENU
    }

    /// Same route (section, action, params), regardless of content or age.
    pub fn same_location(&self, other: &NavigationFrame) -> bool {
        self.section == other.section && self.action == other.action && self.params == other.params
    }

    pub fn location(&self) -> String {
        format!("{}:{}", self.section, self.action)
    }
}
