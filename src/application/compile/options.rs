//! Compile Options

use std::path::PathBuf;

use crate::domain::value_objects::Target;

/// Where to read from and write to
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Diagram path or identifier
    pub source: String,
    /// Directory searched for bare identifiers
    pub source_dir: PathBuf,
    /// Manifest root (`<category>/<name>/manifest.toml`)
    pub components: PathBuf,
    /// Artifact output directory
    pub out: PathBuf,
    pub target: Target,
    /// Orchestrator namespace written into generated metadata
    pub namespace: Option<String>,
}

impl CompileOptions {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_dir: PathBuf::from("diagrams"),
            components: PathBuf::from("components"),
            out: PathBuf::from(".microzoo/stacks"),
            target: Target::default(),
            namespace: None,
        }
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    pub fn with_components(mut self, dir: impl Into<PathBuf>) -> Self {
        self.components = dir.into();
        self
    }

    pub fn with_out(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out = dir.into();
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }
}
