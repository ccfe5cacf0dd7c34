//! File-system manifest loader
//!
//! Layout: `root/<category>/<component>/manifest.toml`. The directory names
//! give the manifest its category and default name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::entities::{ComponentManifest, ManifestError, ManifestPort, Registry};
use crate::domain::value_objects::Protocol;

/// Descriptor file name inside each component directory
pub const DESCRIPTOR_FILE: &str = "manifest.toml";

/// On-disk shape of `manifest.toml`
#[derive(Debug, Deserialize)]
struct Descriptor {
    /// Overrides the directory name
    name: Option<String>,
    image: Option<String>,
    #[serde(default)]
    default: bool,
    #[serde(default)]
    ports: Vec<PortDescriptor>,
    #[serde(default)]
    environment: BTreeMap<String, String>,
    #[serde(default)]
    required_env: Vec<String>,
    upstream_env: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
    #[serde(default)]
    bindings: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct PortDescriptor {
    port: i64,
    protocol: Option<String>,
    publish: Option<i64>,
}

/// Load every descriptor under `root` into a registry
pub fn load(root: &Path) -> Result<Registry, ManifestError> {
    if !root.is_dir() {
        return Err(ManifestError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut manifests = Vec::new();
    for category_dir in visible_dirs(root)? {
        let category = dir_name(&category_dir);
        for component_dir in visible_dirs(&category_dir)? {
            let descriptor = component_dir.join(DESCRIPTOR_FILE);
            if !descriptor.is_file() {
                warn!(
                    directory = %component_dir.display(),
                    "no {} found; skipping", DESCRIPTOR_FILE
                );
                continue;
            }

            let content = fs::read_to_string(&descriptor).map_err(|source| ManifestError::Io {
                path: descriptor.clone(),
                source,
            })?;
            let (manifest, unknown) =
                parse_descriptor(&descriptor, &category, &dir_name(&component_dir), &content)?;
            for key in unknown {
                warn!(file = %descriptor.display(), key = %key, "unknown manifest key ignored");
            }
            debug!(manifest = %manifest.qualified_name(), image = %manifest.image, "loaded manifest");
            manifests.push(manifest);
        }
    }

    Registry::from_manifests(manifests)
}

/// Parse one descriptor. Returns the manifest and any unknown keys.
pub fn parse_descriptor(
    path: &Path,
    category: &str,
    name: &str,
    content: &str,
) -> Result<(ComponentManifest, Vec<String>), ManifestError> {
    let mut unknown = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);
    let descriptor: Descriptor = serde_ignored::deserialize(deserializer, |p| {
        unknown.push(p.to_string());
    })
    .map_err(|e| ManifestError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let image = descriptor
        .image
        .filter(|image| !image.trim().is_empty())
        .ok_or_else(|| ManifestError::MissingImage {
            path: path.to_path_buf(),
        })?;

    let mut ports = Vec::with_capacity(descriptor.ports.len());
    for port in descriptor.ports {
        ports.push(ManifestPort {
            port: valid_port(path, port.port)?,
            protocol: port
                .protocol
                .as_deref()
                .map(Protocol::new)
                .unwrap_or_default(),
            publish: port.publish.map(|p| valid_port(path, p)).transpose()?,
        });
    }

    let manifest = ComponentManifest {
        name: descriptor.name.unwrap_or_else(|| name.to_string()),
        category: category.to_string(),
        image,
        ports,
        environment: descriptor.environment,
        required_env: descriptor.required_env,
        upstream_env: descriptor.upstream_env,
        properties: descriptor.properties,
        bindings: descriptor
            .bindings
            .into_iter()
            .map(|(protocol, env)| (Protocol::new(&protocol), env))
            .collect(),
        default: descriptor.default,
    };
    Ok((manifest, unknown))
}

fn valid_port(path: &Path, port: i64) -> Result<u16, ManifestError> {
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(ManifestError::InvalidPort {
            path: path.to_path_buf(),
            port,
        }),
    }
}

/// Sub-directories not starting with `.`, sorted by name
fn visible_dirs(dir: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let entries = fs::read_dir(dir).map_err(|source| ManifestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ManifestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() && !dir_name(&path).starts_with('.') {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
