//! Inbound events as delivered by a transport

use std::fmt;

/// Prefix marking a button press in line-oriented transports.
pub const CALLBACK_PREFIX: &str = "cb:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Raw callback data of a pressed button.
    Callback(String),
    /// Free text typed by the user.
    Text(String),
    /// A slash command, stored lowercase without the slash or bot suffix.
    Command(String),
}

impl InboundEvent {
    pub fn callback(raw: impl Into<String>) -> Self {
        Self::Callback(raw.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// `/Start@eat_bot args` -> `Command("start")`
    pub fn command(raw: &str) -> Self {
        let name = raw
            .trim()
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '@')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        Self::Command(name)
    }

    /// Parse one line of input: `cb:<token>`, `/command` or free text.
    pub fn parse(input: &str) -> Self {
        if let Some(raw) = input.strip_prefix(CALLBACK_PREFIX) {
            Self::callback(raw.trim())
        } else if input.trim_start().starts_with('/') {
            Self::command(input)
        } else {
            Self::text(input)
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Callback(_) => "callback",
            Self::Text(_) => "text",
            Self::Command(_) => "command",
        }
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(raw) => write!(f, "{CALLBACK_PREFIX}{raw}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Command(name) => write!(f, "/{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            InboundEvent::parse("cb:recipes:view:id=4"),
            InboundEvent::Callback("recipes:view:id=4".into())
        );
        assert_eq!(
            InboundEvent::parse("/Start@eat_bot now"),
            InboundEvent::Command("start".into())
        );
        assert_eq!(
            InboundEvent::parse("2 eggs"),
            InboundEvent::Text("2 eggs".into())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(InboundEvent::callback("nav:back").to_string(), "cb:nav:back");
        assert_eq!(InboundEvent::command("/menu").to_string(), "/menu");
        assert_eq!(InboundEvent::command("/menu").kind(), "command");
    }
}
