//! Error types for microzoo
//!
//! One `thiserror` enum per stage lives next to the stage; `MicrozooError`
//! wraps them and fixes the message prefix each kind is shown with.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::entities::ManifestError;
use crate::domain::ports::DeployError;
use crate::domain::services::{UnresolvedComponentError, ValidationReport};
use crate::parser::ParseError;

/// Result type alias for microzoo operations
pub type MicrozooResult<T> = Result<T, MicrozooError>;

/// Main error type for microzoo operations
#[derive(Error, Debug)]
pub enum MicrozooError {
    /// Diagram text rejected by the parser
    #[error("parse error in {file}: {source}")]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    /// A validator found violations
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationReport),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("unresolved component: {0}")]
    Unresolved(#[from] UnresolvedComponentError),

    /// Tool failures, launch failures and tunnel failures
    #[error(transparent)]
    Deploy(#[from] DeployError),

    /// `drop` or `status` without a prior `compile`
    #[error("no artifact found at {path} (run `microzoo compile` first)")]
    ArtifactNotFound { path: PathBuf },

    /// Diagram identifier matched no file
    #[error("diagram not found: '{source_name}' (looked in {})", .searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    DiagramNotFound {
        source_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Post-deployment probes failed
    #[error("check failed: {}", .failures.join("; "))]
    ProbeFailed { failures: Vec<String> },

    /// Stack rendering or re-reading a stored artifact
    #[error("stack YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MicrozooError {
    /// Short machine-readable kind, used by `--json` output
    pub fn kind(&self) -> &'static str {
        match self {
            MicrozooError::Parse { .. } => "parse",
            MicrozooError::Validation(_) => "validation",
            MicrozooError::Manifest(_) => "manifest",
            MicrozooError::Unresolved(_) => "unresolved",
            MicrozooError::Deploy(DeployError::Deployment { .. }) => "deployment",
            MicrozooError::Deploy(DeployError::Launch(_)) => "launch",
            MicrozooError::Deploy(DeployError::Tunnel(_)) => "tunnel",
            MicrozooError::ArtifactNotFound { .. } => "artifact_not_found",
            MicrozooError::DiagramNotFound { .. } => "diagram_not_found",
            MicrozooError::Config(_) => "config",
            MicrozooError::ProbeFailed { .. } => "probe",
            MicrozooError::Yaml(_) => "yaml",
            MicrozooError::Io { .. } => "io",
        }
    }
}
