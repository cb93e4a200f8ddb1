//! Typed application settings values.
//!
//! Settings are stored as text alongside a declared kind; values are
//! validated against the kind before persisting and parsed back into a
//! typed value when read.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Declared kind of a setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    /// Free-form text.
    String,
    /// 64-bit signed integer.
    Integer,
    /// `true`/`false`.
    Boolean,
    /// Arbitrary JSON document.
    Json,
}

impl SettingKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Json => "json",
        }
    }

    /// Parses a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Text value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
    /// JSON value.
    Json(serde_json::Value),
}

/// Setting parse/render errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingError {
    /// Raw text does not parse as the declared kind.
    #[error("value does not parse as {kind}: {raw}")]
    InvalidValue {
        /// Declared kind.
        kind: SettingKind,
        /// Offending raw text.
        raw: String,
    },
}

impl SettingValue {
    /// Parses raw stored text according to the declared kind.
    ///
    /// # Errors
    ///
    /// Returns `SettingError::InvalidValue` when the text does not parse.
    pub fn parse(kind: SettingKind, raw: &str) -> Result<Self, SettingError> {
        let invalid = || SettingError::InvalidValue {
            kind,
            raw: raw.to_string(),
        };

        match kind {
            SettingKind::String => Ok(Self::String(raw.to_string())),
            SettingKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|_| invalid()),
            SettingKind::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(Self::Boolean(true)),
                "false" | "0" => Ok(Self::Boolean(false)),
                _ => Err(invalid()),
            },
            SettingKind::Json => serde_json::from_str(raw)
                .map(Self::Json)
                .map_err(|_| invalid()),
        }
    }

    /// Renders the value back to its stored text form.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Json(v) => v.to_string(),
        }
    }

    /// Returns the kind this value belongs to.
    #[must_use]
    pub const fn kind(&self) -> SettingKind {
        match self {
            Self::String(_) => SettingKind::String,
            Self::Integer(_) => SettingKind::Integer,
            Self::Boolean(_) => SettingKind::Boolean,
            Self::Json(_) => SettingKind::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SettingKind::String, "hello")]
    #[case(SettingKind::Integer, "42")]
    #[case(SettingKind::Boolean, "true")]
    #[case(SettingKind::Json, r#"{"page_size":10}"#)]
    fn test_round_trip_through_declared_kind(#[case] kind: SettingKind, #[case] raw: &str) {
        let value = SettingValue::parse(kind, raw).unwrap();
        assert_eq!(value.kind(), kind);

        let rendered = value.render();
        assert_eq!(SettingValue::parse(kind, &rendered).unwrap(), value);
    }

    #[test]
    fn test_integer_rejects_garbage() {
        let result = SettingValue::parse(SettingKind::Integer, "ten");
        assert!(matches!(result, Err(SettingError::InvalidValue { .. })));
    }

    #[test]
    fn test_boolean_accepts_numeric_forms() {
        assert_eq!(
            SettingValue::parse(SettingKind::Boolean, "1").unwrap(),
            SettingValue::Boolean(true)
        );
        assert_eq!(
            SettingValue::parse(SettingKind::Boolean, "0").unwrap(),
            SettingValue::Boolean(false)
        );
    }

    #[test]
    fn test_json_must_be_valid() {
        assert!(SettingValue::parse(SettingKind::Json, "{not json").is_err());
    }
}
