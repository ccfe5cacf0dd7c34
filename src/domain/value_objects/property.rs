//! Property values attached to diagram components

use std::fmt;

use serde::Serialize;

/// A free-form component property (`replicas = 2`, `payloadSize = 500`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Bool(bool),
}

impl PropertyValue {
    /// Interpret raw diagram text.
    ///
    /// `true`/`false` become booleans, decimal integers become integers,
    /// anything else is a string with surrounding double quotes removed.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(inner) = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return PropertyValue::String(inner.to_string());
        }

        match trimmed {
            "true" => return PropertyValue::Bool(true),
            "false" => return PropertyValue::Bool(false),
            _ => {}
        }

        match trimmed.parse::<i64>() {
            Ok(n) => PropertyValue::Integer(n),
            Err(_) => PropertyValue::String(trimmed.to_string()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(n) => Some(*n),
            PropertyValue::String(s) => s.parse().ok(),
            PropertyValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Integer(n) => write!(f, "{}", n),
            PropertyValue::Bool(b) => write!(f, "{}", b),
        }
    }
}
