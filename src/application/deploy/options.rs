//! Deploy Options

use std::path::PathBuf;

use crate::application::source::diagram_id;
use crate::domain::value_objects::{ComponentId, Target};

/// A previously compiled artifact, addressed by source and target
#[derive(Debug, Clone)]
pub struct StoredStack {
    /// Artifact output directory
    pub out: PathBuf,
    /// Diagram path or identifier, as given to `compile`
    pub source: String,
    /// Directory bare identifiers are looked up in
    pub source_dir: PathBuf,
    pub target: Target,
}

impl StoredStack {
    pub fn new(out: impl Into<PathBuf>, source: impl Into<String>, target: Target) -> Self {
        Self {
            out: out.into(),
            source: source.into(),
            source_dir: PathBuf::from("diagrams"),
            target,
        }
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    pub fn id(&self) -> ComponentId {
        diagram_id(&self.source, &self.source_dir)
    }
}
