//! Stack artifact storage
//!
//! `compile` writes `<out>/<diagram-id>.<target>.yaml`; `drop` and `status`
//! read it back without recompiling. Writes go through a temp file in the same
//! directory and are renamed into place.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml_ng::Value;
use tracing::debug;

use crate::domain::entities::StackDocument;
use crate::domain::ports::StackArtifact;
use crate::domain::services::PART_OF_LABEL;
use crate::domain::value_objects::{ComponentId, Target};
use crate::error::{MicrozooError, MicrozooResult};

pub fn artifact_path(out: &Path, id: &ComponentId, target: Target) -> PathBuf {
    out.join(format!("{}.{}.yaml", id, target.identifier()))
}

/// Render `document` and store it atomically
pub fn write(out: &Path, document: &StackDocument) -> MicrozooResult<StackArtifact> {
    let id = ComponentId::normalize(document.name());
    let path = artifact_path(out, &id, document.target());
    let yaml = document.render()?;

    std::fs::create_dir_all(out).map_err(|source| MicrozooError::Io {
        path: out.to_path_buf(),
        source,
    })?;
    let io_err = |source| MicrozooError::Io {
        path: path.clone(),
        source,
    };
    let mut file = tempfile::NamedTempFile::new_in(out).map_err(io_err)?;
    file.write_all(yaml.as_bytes()).map_err(io_err)?;
    file.persist(&path).map_err(|e| io_err(e.error))?;
    debug!(path = %path.display(), "artifact written");

    Ok(StackArtifact {
        path,
        target: document.target(),
        project: document.name().to_string(),
        workloads: document.workloads(),
        tunnels: document.tunnels(),
    })
}

/// Re-read a stored artifact. Project and workload names come from the file;
/// tunnels are only known after a fresh compile.
pub fn load(out: &Path, id: &ComponentId, target: Target) -> MicrozooResult<StackArtifact> {
    let path = artifact_path(out, id, target);
    if !path.is_file() {
        return Err(MicrozooError::ArtifactNotFound { path });
    }
    let content = std::fs::read_to_string(&path).map_err(|source| MicrozooError::Io {
        path: path.clone(),
        source,
    })?;

    let (project, workloads) = match target {
        Target::Compose => read_compose(&content)?,
        Target::Kubernetes => read_orchestrator(&content)?,
    };
    let project = project.unwrap_or_else(|| id.to_string());

    Ok(StackArtifact {
        path,
        target,
        project,
        workloads,
        tunnels: Vec::new(),
    })
}

fn read_compose(content: &str) -> MicrozooResult<(Option<String>, Vec<String>)> {
    let root: Value = serde_yaml_ng::from_str(content)?;
    let project = root.get("name").and_then(Value::as_str).map(str::to_string);
    let workloads = root
        .get("services")
        .and_then(Value::as_mapping)
        .map(|services| {
            services
                .keys()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok((project, workloads))
}

fn read_orchestrator(content: &str) -> MicrozooResult<(Option<String>, Vec<String>)> {
    let mut project = None;
    let mut workloads = Vec::new();

    for document in serde_yaml_ng::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        if value.get("kind").and_then(Value::as_str) != Some("Deployment") {
            continue;
        }
        let metadata = value.get("metadata");
        if let Some(name) = metadata.and_then(|m| m.get("name")).and_then(Value::as_str) {
            workloads.push(name.to_string());
        }
        if project.is_none() {
            project = metadata
                .and_then(|m| m.get("labels"))
                .and_then(|l| l.get(PART_OF_LABEL))
                .and_then(Value::as_str)
                .map(str::to_string);
        }
    }
    Ok((project, workloads))
}
