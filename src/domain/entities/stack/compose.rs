//! Compose document types

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Root of a compose file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeDocument {
    /// Project name
    pub name: String,
    /// Services in declaration order (serialized as a map)
    #[serde(serialize_with = "ordered_map")]
    pub services: Vec<(String, ComposeService)>,
}

impl ComposeDocument {
    pub fn service(&self, id: &str) -> Option<&ComposeService> {
        self.services
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, service)| service)
    }
}

/// A single compose service entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeService {
    pub image: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Published mappings, `"source:target"`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Ports reachable only inside the stack network
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expose: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy: Option<ComposeDeploy>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeDeploy {
    pub replicas: u32,
}

fn ordered_map<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
