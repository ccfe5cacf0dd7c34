//! Component identity - the normalized form of a diagram display name

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a diagram component.
///
/// Derived from the display name: lower-cased with all whitespace removed,
/// so `"Catalog Db"` and `"catalogdb"` name the same component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Normalize a display name into an id
    pub fn normalize(display_name: &str) -> Self {
        let id: String = display_name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self::normalize(value)
    }
}
