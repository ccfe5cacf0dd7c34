//! Diagram source lookup
//!
//! A source is either a path to an existing file or a bare identifier looked
//! up in the diagram directory.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::ComponentId;
use crate::error::{MicrozooError, MicrozooResult};
use crate::parser::diagram_name;

/// Extensions tried for a bare identifier, in order
pub const DIAGRAM_EXTENSIONS: [&str; 3] = ["puml", "plantuml", "txt"];

pub fn resolve_diagram(source: &str, source_dir: &Path) -> MicrozooResult<PathBuf> {
    let direct = PathBuf::from(source);
    if direct.is_file() {
        return Ok(direct);
    }

    let candidates: Vec<PathBuf> = DIAGRAM_EXTENSIONS
        .iter()
        .map(|ext| source_dir.join(format!("{}.{}", source, ext)))
        .collect();
    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(MicrozooError::DiagramNotFound {
            source_name: source.to_string(),
            searched: candidates,
        }),
    }
}

/// Artifact id for a source, the same one `compile` derives. A source that
/// no longer resolves falls back to its name with a known diagram extension
/// stripped.
pub fn diagram_id(source: &str, source_dir: &Path) -> ComponentId {
    if let Ok(path) = resolve_diagram(source, source_dir) {
        return ComponentId::normalize(diagram_name(&path));
    }
    let path = Path::new(source);
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or(source);
    let has_diagram_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DIAGRAM_EXTENSIONS.contains(&e));
    if has_diagram_extension {
        ComponentId::normalize(diagram_name(path))
    } else {
        ComponentId::normalize(file_name)
    }
}
