//! Keyboard layouts attached to rendered screens
//!
//! Every button carries an encoded callback token, so a token that does not
//! fit the transport budget is rejected while the screen is being built.

use serde::{Deserialize, Serialize};

use crate::callback::{CallbackCodec, CallbackToken, CodecError};

/// A single inline button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: &CallbackToken) -> Result<Self, CodecError> {
        Self::with_codec(label, token, &CallbackCodec::default())
    }

    pub fn with_codec(
        label: impl Into<String>,
        token: &CallbackToken,
        codec: &CallbackCodec,
    ) -> Result<Self, CodecError> {
        Ok(Self {
            label: label.into(),
            token: codec.encode_token(token)?,
        })
    }

    pub fn back() -> Self {
        Self::fixed("◀️ Back", CallbackToken::back())
    }

    pub fn main_menu() -> Self {
        Self::fixed("🏠 Main menu", CallbackToken::main_menu())
    }

    pub fn commit() -> Self {
        Self::fixed("✅ Confirm", CallbackToken::dialog_commit())
    }

    pub fn cancel() -> Self {
        Self::fixed("❌ Cancel", CallbackToken::dialog_cancel())
    }

    /// Built-in tokens are short constants; encoding them cannot exceed the budget.
    fn fixed(label: &str, token: CallbackToken) -> Self {
        Self {
            label: label.to_string(),
            token: token.to_string(),
        }
    }
}

/// Rows of inline buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    pub fn row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Grid of `columns` buttons per row followed by a back row.
    pub fn menu(items: Vec<Button>, columns: usize) -> Self {
        let columns = columns.max(1);
        let mut keyboard = Self::empty();
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            keyboard = keyboard.row(items.by_ref().take(columns).collect());
        }
        keyboard.row(vec![Button::back()])
    }

    /// One button per row, an optional pagination row, then a back row.
    ///
    /// `page` is 1-based. `page_token` builds the token for a given page;
    /// page buttons are encoded with `codec`.
    pub fn paginated<F>(
        items: Vec<Button>,
        page: usize,
        total_pages: usize,
        page_token: F,
        codec: &CallbackCodec,
    ) -> Result<Self, CodecError>
    where
        F: Fn(usize) -> CallbackToken,
    {
        let mut keyboard = Self::empty();
        for item in items {
            keyboard = keyboard.row(vec![item]);
        }

        if total_pages > 1 {
            let mut pagination = Vec::with_capacity(3);
            if page > 1 {
                pagination.push(Button::with_codec("⬅️", &page_token(page - 1), codec)?);
            }
            pagination.push(Button::with_codec(
                format!("{page}/{total_pages}"),
                &CallbackToken::no_action(),
                codec,
            )?);
            if page < total_pages {
                pagination.push(Button::with_codec("➡️", &page_token(page + 1), codec)?);
            }
            keyboard = keyboard.row(pagination);
        }

        Ok(keyboard.row(vec![Button::back()]))
    }

    /// Action buttons, one per row, followed by a back row.
    pub fn detail(actions: Vec<Button>) -> Self {
        let mut keyboard = Self::empty();
        for action in actions {
            keyboard = keyboard.row(vec![action]);
        }
        keyboard.row(vec![Button::back()])
    }

    /// Commit / cancel choice used by dialog confirmation steps.
    pub fn confirm() -> Self {
        Self::empty().row(vec![Button::commit(), Button::cancel()])
    }

    /// Shown while a dialog waits for free text.
    pub fn dialog_input() -> Self {
        Self::empty().row(vec![Button::cancel()])
    }

    pub fn back_only() -> Self {
        Self::empty().row(vec![Button::back()])
    }

    pub fn error() -> Self {
        Self::empty().row(vec![Button::back(), Button::main_menu()])
    }

    pub fn main_menu_only() -> Self {
        Self::empty().row(vec![Button::main_menu()])
    }
}
