//! Component manifests and the registry that indexes them by kind

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::value_objects::Protocol;

/// A port a component kind exposes by default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPort {
    pub port: u16,
    pub protocol: Protocol,
    /// Host port published by default, if any
    pub publish: Option<u16>,
}

/// Reusable description of how a component kind maps to a runnable unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentManifest {
    /// Leaf directory name (e.g. `go-service`)
    pub name: String,
    /// Parent directory name (e.g. `service`)
    pub category: String,
    pub image: String,
    pub ports: Vec<ManifestPort>,
    /// Environment templates; `{id}`, `{name}` and `{kind}` are expanded
    pub environment: BTreeMap<String, String>,
    pub required_env: Vec<String>,
    /// Variable that receives the upstream service list, when supported
    pub upstream_env: Option<String>,
    /// Diagram property key -> environment variable
    pub properties: BTreeMap<String, String>,
    /// Environment injected into clients relating over a protocol;
    /// `{host}`, `{port}`, `{id}` and `{name}` are expanded
    pub bindings: BTreeMap<Protocol, BTreeMap<String, String>>,
    /// Answers lookups of the bare category name
    pub default: bool,
}

impl ComponentManifest {
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }

    /// First declared port speaking `protocol`
    pub fn port_for(&self, protocol: &Protocol) -> Option<&ManifestPort> {
        self.ports.iter().find(|p| &p.protocol == protocol)
    }

    pub fn binding(&self, protocol: &Protocol) -> Option<&BTreeMap<String, String>> {
        self.bindings.get(protocol)
    }
}

/// Errors raised while loading or indexing manifests
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed descriptor {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("descriptor {path} is missing the mandatory 'image' field")]
    MissingImage { path: PathBuf },

    #[error("descriptor {path} declares invalid port {port} (expected 1-65535)")]
    InvalidPort { path: PathBuf, port: i64 },

    #[error("component name '{name}' is declared by both {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("category '{category}' has more than one default manifest ({first}, {second})")]
    AmbiguousDefault {
        category: String,
        first: String,
        second: String,
    },
}

/// Immutable index of manifests, keyed by component kind.
///
/// Each manifest answers three keys: its name, `category/name`, and the bare
/// category when it is that category's default (marked `default = true`, or
/// the only manifest in the category).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    manifests: Vec<ComponentManifest>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn from_manifests(mut manifests: Vec<ComponentManifest>) -> Result<Self, ManifestError> {
        manifests.sort_by_key(|m| m.qualified_name());

        let mut index = HashMap::new();
        let mut by_category: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (i, manifest) in manifests.iter().enumerate() {
            let name = manifest.name.to_ascii_lowercase();
            if let Some(&existing) = index.get(&name) {
                let first: &ComponentManifest = &manifests[existing];
                return Err(ManifestError::DuplicateName {
                    name,
                    first: first.qualified_name(),
                    second: manifest.qualified_name(),
                });
            }
            index.insert(name, i);
            index.insert(manifest.qualified_name().to_ascii_lowercase(), i);
            by_category
                .entry(manifest.category.to_ascii_lowercase())
                .or_default()
                .push(i);
        }

        for (category, members) in by_category {
            if index.contains_key(&category) {
                continue;
            }
            let defaults: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&i| manifests[i].default)
                .collect();
            let chosen = match (defaults.as_slice(), members.as_slice()) {
                ([only], _) => Some(*only),
                ([first, second, ..], _) => {
                    return Err(ManifestError::AmbiguousDefault {
                        category,
                        first: manifests[*first].qualified_name(),
                        second: manifests[*second].qualified_name(),
                    })
                }
                ([], [only]) => Some(*only),
                ([], _) => None,
            };
            if let Some(i) = chosen {
                index.insert(category, i);
            }
        }

        Ok(Self { manifests, index })
    }

    /// Find the manifest for a component kind.
    ///
    /// Case-insensitive; `category:name` is accepted as `category/name`.
    pub fn lookup(&self, kind: &str) -> Option<&ComponentManifest> {
        let key = kind.trim().to_ascii_lowercase().replace(':', "/");
        self.index.get(&key).map(|&i| &self.manifests[i])
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}
