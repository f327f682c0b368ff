//! Dialog events - inbound input as seen by a dialog step

use serde::{Deserialize, Serialize};

/// Category of input a step accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputCategory {
    /// Free-text message.
    Text,
    /// A confirmation button.
    Choice,
}

/// Answer to a confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmChoice {
    Commit,
    Cancel,
}

/// Events that drive a dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogEvent {
    /// User typed a message.
    Text(String),

    /// User pressed a confirmation button.
    Choice(ConfirmChoice),

    /// Global cancel trigger, accepted in every step.
    Cancel,
}

impl DialogEvent {
    /// Input category, or `None` for the global cancel trigger.
    pub fn category(&self) -> Option<InputCategory> {
        match self {
            Self::Text(_) => Some(InputCategory::Text),
            Self::Choice(_) => Some(InputCategory::Choice),
            Self::Cancel => None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_categories() {
        assert_eq!(DialogEvent::text("x").category(), Some(InputCategory::Text));
        assert_eq!(
            DialogEvent::Choice(ConfirmChoice::Commit).category(),
            Some(InputCategory::Choice)
        );
        assert_eq!(DialogEvent::Cancel.category(), None);
    }
}
