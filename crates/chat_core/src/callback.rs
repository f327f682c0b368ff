//! Callback codec - the compact token attached to a button
//!
//! Wire format: `section:action:key1=value1:key2=value2`, ASCII, bounded by
//! the transport's byte budget (64 bytes on the reference platform).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field delimiter.
pub const DELIMITER: char = ':';
/// Key/value separator inside a parameter field.
pub const KV_SEPARATOR: char = '=';
/// Default serialized size budget in bytes.
pub const DEFAULT_BYTE_BUDGET: usize = 64;
/// Maximum number of parameters a token may carry.
pub const MAX_PARAMS: usize = 10;

/// Key under which a parameter without `=` is stored on decode.
pub const VALUE_KEY: &str = "value";
/// Key carrying the raw token when decoding falls back to the error route.
pub const RAW_KEY: &str = "raw";

pub const SECTION_NAV: &str = "nav";
pub const ACTION_BACK: &str = "back";
pub const ACTION_MAIN_MENU: &str = "main_menu";
pub const ACTION_NO_ACTION: &str = "no_action";
pub const ACTION_ERROR: &str = "error";

pub const SECTION_DIALOG: &str = "dialog";
pub const ACTION_COMMIT: &str = "commit";
pub const ACTION_CANCEL: &str = "cancel";

/// Ordered parameters. Keys are kept sorted so encoding is deterministic.
pub type Params = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("callback section must not be empty")]
    EmptySection,

    #[error("callback action must not be empty")]
    EmptyAction,

    #[error("too many callback parameters: {count} (max {max})")]
    TooManyParams { count: usize, max: usize },

    #[error("reserved character in {field}: {value:?}")]
    ReservedCharacter { field: &'static str, value: String },

    #[error("callback data must be ASCII: {0:?}")]
    NonAscii(String),

    #[error("encoded callback is {len} bytes, budget is {budget}")]
    EncodingTooLarge { len: usize, budget: usize },
}

/// A decoded interaction token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackToken {
    pub section: String,
    pub action: String,
    #[serde(default)]
    pub params: Params,
}

impl CallbackToken {
    pub fn new(section: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            action: action.into(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn is(&self, section: &str, action: &str) -> bool {
        self.section == section && self.action == action
    }

    /// Encode with the default budget.
    pub fn encode(&self) -> Result<String, CodecError> {
        CallbackCodec::default().encode_token(self)
    }

    /// Decode with the fallback rules of [`CallbackCodec::decode`].
    pub fn decode(raw: &str) -> Self {
        CallbackCodec::decode(raw)
    }

    pub fn back() -> Self {
        Self::new(SECTION_NAV, ACTION_BACK)
    }

    pub fn main_menu() -> Self {
        Self::new(SECTION_NAV, ACTION_MAIN_MENU)
    }

    pub fn no_action() -> Self {
        Self::new(SECTION_NAV, ACTION_NO_ACTION)
    }

    pub fn dialog_commit() -> Self {
        Self::new(SECTION_DIALOG, ACTION_COMMIT)
    }

    pub fn dialog_cancel() -> Self {
        Self::new(SECTION_DIALOG, ACTION_CANCEL)
    }

    /// The route used when a token cannot be parsed.
    fn error_route(raw: &str) -> Self {
        Self::new(SECTION_NAV, ACTION_ERROR).with_param(RAW_KEY, raw)
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.section, DELIMITER, self.action)?;
        for (key, value) in &self.params {
            write!(f, "{}{}{}{}", DELIMITER, key, KV_SEPARATOR, value)?;
        }
        Ok(())
    }
}

/// Encoder/decoder bound to a byte budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackCodec {
    budget: usize,
}

impl Default for CallbackCodec {
    fn default() -> Self {
        Self::new(DEFAULT_BYTE_BUDGET)
    }
}

impl CallbackCodec {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn encode(&self, section: &str, action: &str, params: &Params) -> Result<String, CodecError> {
        if section.is_empty() {
            return Err(CodecError::EmptySection);
        }
        if action.is_empty() {
            return Err(CodecError::EmptyAction);
        }
        if params.len() > MAX_PARAMS {
            return Err(CodecError::TooManyParams {
                count: params.len(),
                max: MAX_PARAMS,
            });
        }

        check_field("section", section, &[DELIMITER])?;
        check_field("action", action, &[DELIMITER])?;
        for (key, value) in params {
            if key.is_empty() {
                return Err(CodecError::ReservedCharacter {
                    field: "param key",
                    value: key.clone(),
                });
            }
            check_field("param key", key, &[DELIMITER, KV_SEPARATOR])?;
            check_field("param value", value, &[DELIMITER])?;
        }

        let mut encoded = String::with_capacity(self.budget);
        encoded.push_str(section);
        encoded.push(DELIMITER);
        encoded.push_str(action);
        for (key, value) in params {
            encoded.push(DELIMITER);
            encoded.push_str(key);
            encoded.push(KV_SEPARATOR);
            encoded.push_str(value);
        }

        if encoded.len() > self.budget {
            return Err(CodecError::EncodingTooLarge {
                len: encoded.len(),
                budget: self.budget,
            });
        }
        Ok(encoded)
    }

    pub fn encode_token(&self, token: &CallbackToken) -> Result<String, CodecError> {
        self.encode(&token.section, &token.action, &token.params)
    }

    /// Decode a raw token. Never fails: malformed input maps to the
    /// `nav:error` route carrying the raw string.
    pub fn decode(raw: &str) -> CallbackToken {
        if raw.is_empty() || raw == ACTION_NO_ACTION {
            return CallbackToken::no_action();
        }

        let mut parts = raw.split(DELIMITER);
        let (section, action) = match (parts.next(), parts.next()) {
            (Some(section), Some(action)) if !section.is_empty() && !action.is_empty() => {
                (section, action)
            }
            _ => {
                tracing::warn!(raw, "malformed callback data");
                return CallbackToken::error_route(raw);
            }
        };

        let mut params = Params::new();
        for part in parts {
            match part.split_once(KV_SEPARATOR) {
                Some((key, value)) => {
                    params.insert(key.to_string(), value.to_string());
                }
                None => {
                    params.insert(VALUE_KEY.to_string(), part.to_string());
                }
            }
        }

        CallbackToken {
            section: section.to_string(),
            action: action.to_string(),
            params,
        }
    }
}

fn check_field(field: &'static str, value: &str, reserved: &[char]) -> Result<(), CodecError> {
    if !value.is_ascii() {
        return Err(CodecError::NonAscii(value.to_string()));
    }
    if value.contains(reserved) {
        return Err(CodecError::ReservedCharacter {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Encode with the default budget.
pub fn encode(section: &str, action: &str, params: &Params) -> Result<String, CodecError> {
    CallbackCodec::default().encode(section, action, params)
}

/// Decode with the default fallback rules.
pub fn decode(raw: &str) -> CallbackToken {
    CallbackCodec::decode(raw)
}
