//! Protocol value object - the normalized tag carried by a relation

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Protocol used when no relation label names one
pub const DEFAULT_PROTOCOL: &str = "http-rest";

/// Normalized relation protocol (e.g. `http-rest`, `jdbc`, `amqp`).
///
/// Lower-cased; runs of whitespace, `_` and `/` collapse into a single `-`.
/// The HTTP spellings `http`, `https`, `rest` and `http/rest` all become
/// `http-rest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Protocol(String);

impl Protocol {
    pub fn new(raw: &str) -> Self {
        let mut normalized = String::with_capacity(raw.len());
        let mut pending_dash = false;

        for c in raw.trim().chars() {
            if c.is_whitespace() || c == '_' || c == '/' || c == '-' {
                pending_dash = !normalized.is_empty();
                continue;
            }
            if pending_dash {
                normalized.push('-');
                pending_dash = false;
            }
            normalized.extend(c.to_lowercase());
        }

        match normalized.as_str() {
            "" | "http" | "https" | "rest" | "http-rest" | "https-rest" => Self::http_rest(),
            _ => Self(normalized),
        }
    }

    pub fn http_rest() -> Self {
        Self(DEFAULT_PROTOCOL.to_string())
    }

    pub fn is_http(&self) -> bool {
        self.0 == DEFAULT_PROTOCOL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self::http_rest()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Protocol::new(&raw))
    }
}
