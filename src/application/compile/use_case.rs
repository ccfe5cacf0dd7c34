//! Compile Use Case
//!
//! parse -> validate diagram -> load registry -> resolve -> validate
//! deployable model -> generate -> write artifact.
//!
//! Every stage must succeed before the next one runs.

use std::path::PathBuf;

use tracing::debug;

use crate::domain::entities::{ResolvedSystem, StackDocument};
use crate::domain::ports::StackArtifact;
use crate::domain::services::{
    deployable_validator, diagram_validator, generate_with, resolve, GenerateOptions,
    ValidationReport, ValidationStage,
};
use crate::error::MicrozooResult;
use crate::infrastructure::{artifact, manifest};
use crate::parser;

use crate::application::source::resolve_diagram;
use super::options::CompileOptions;

/// Everything a compile produced
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Diagram file that was read
    pub diagram: PathBuf,
    pub system: ResolvedSystem,
    pub document: StackDocument,
    pub artifact: StackArtifact,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompileUseCase;

impl CompileUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, options: &CompileOptions) -> MicrozooResult<CompileResult> {
        let diagram = resolve_diagram(&options.source, &options.source_dir)?;
        debug!(diagram = %diagram.display(), "parsing");
        let raw = parser::parse_file(&diagram)?;
        debug!(
            components = raw.components.len(),
            relations = raw.relations.len(),
            "parsed"
        );

        ValidationReport::check(ValidationStage::Diagram, diagram_validator::validate(&raw))?;

        let registry = manifest::load(&options.components)?;
        debug!(manifests = registry.len(), "registry loaded");
        let system = resolve(&raw, &registry)?;

        ValidationReport::check(
            ValidationStage::Deployable,
            deployable_validator::validate_for(&system, options.target),
        )?;

        let generate_options = GenerateOptions {
            namespace: options.namespace.clone(),
        };
        let document = generate_with(&system, options.target, &generate_options);
        let artifact = artifact::write(&options.out, &document)?;
        debug!(artifact = %artifact.path.display(), target = %options.target, "compiled");

        Ok(CompileResult {
            diagram,
            system,
            document,
            artifact,
        })
    }
}
