//! Decoding of the native textual value representations carried in webhook
//! contract-call arguments.

use crate::error::HandlerError;
use std::collections::BTreeMap;

/// A decoded argument value. Decoding is total: representations that match
/// none of the fixed rules pass through as [`ClarityValue::Opaque`] strings,
/// deferring validation to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Uint(u64),
    Bool(bool),
    Text(String),
    Opaque(String),
}

impl ClarityValue {
    pub fn parse(repr: &str) -> Self {
        if let Some(digits) = repr.strip_prefix('u') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(value) = digits.parse::<u64>() {
                    return Self::Uint(value);
                }
            }
        }
        match repr {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if repr.len() >= 2 && repr.starts_with('"') && repr.ends_with('"') {
            return Self::Text(repr[1..repr.len() - 1].to_string());
        }
        Self::Opaque(repr.to_string())
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Opaque(value) => Some(value),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Uint(value) => serde_json::Value::from(*value),
            Self::Bool(value) => serde_json::Value::from(*value),
            Self::Text(value) | Self::Opaque(value) => serde_json::Value::from(value.clone()),
        }
    }
}

/// Named, decoded arguments of one contract call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs(BTreeMap<String, ClarityValue>);

impl CallArgs {
    pub fn insert(&mut self, name: String, value: ClarityValue) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&ClarityValue> {
        self.0.get(name)
    }

    pub fn uint(&self, name: &'static str) -> Result<u64, HandlerError> {
        self.0
            .get(name)
            .ok_or(HandlerError::MissingArgument(name))?
            .as_uint()
            .ok_or(HandlerError::BadArgument(name, "uint"))
    }

    pub fn opt_uint(&self, name: &str) -> Option<u64> {
        self.0.get(name).and_then(ClarityValue::as_uint)
    }

    pub fn uint_or_zero(&self, name: &str) -> u64 {
        self.opt_uint(name).unwrap_or(0)
    }

    pub fn boolean(&self, name: &'static str) -> Result<bool, HandlerError> {
        self.0
            .get(name)
            .ok_or(HandlerError::MissingArgument(name))?
            .as_bool()
            .ok_or(HandlerError::BadArgument(name, "bool"))
    }

    pub fn boolean_or(&self, name: &str, default: bool) -> bool {
        self.0
            .get(name)
            .and_then(ClarityValue::as_bool)
            .unwrap_or(default)
    }

    pub fn text_or_empty(&self, name: &str) -> String {
        self.0
            .get(name)
            .and_then(ClarityValue::as_text)
            .unwrap_or_default()
            .to_string()
    }

    /// JSON object of the decoded arguments, recorded on the audit row.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}
