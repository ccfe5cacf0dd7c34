//! Deployer Port
//!
//! One implementation per target. A deployer only ever receives an artifact
//! that passed the whole compile pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entities::TunnelSpec;
use crate::domain::value_objects::Target;

use super::process::{exit_label, LaunchError};
use super::tunnel::{TunnelError, TunnelSession};

/// Number of stderr lines kept in a deployment failure
pub const STDERR_TAIL_LINES: usize = 20;

/// A stack file on disk plus what a deployer needs to know about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackArtifact {
    pub path: PathBuf,
    pub target: Target,
    /// Stack (project) name
    pub project: String,
    /// Workload names in declaration order
    pub workloads: Vec<String>,
    /// Port forwards to open after deployment (orchestrator only)
    pub tunnels: Vec<TunnelSpec>,
}

/// Result of a successful deployment
pub struct DeployReport {
    pub target: Target,
    pub project: String,
    pub workloads: Vec<String>,
    /// Open port forwards, when the target needs them
    pub tunnels: Option<Box<dyn TunnelSession>>,
}

impl std::fmt::Debug for DeployReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployReport")
            .field("target", &self.target)
            .field("project", &self.project)
            .field("workloads", &self.workloads)
            .field("tunnels", &self.tunnels.as_ref().map(|t| t.states()))
            .finish()
    }
}

/// Tool output for a deployed stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub target: Target,
    pub project: String,
    pub output: String,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deployment failed: `{command}` exited with {}{}", exit_label(.exit_code), tail_suffix(.stderr_tail))]
    Deployment {
        command: String,
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Tunnel(#[from] TunnelError),
}

fn tail_suffix(tail: &str) -> String {
    if tail.trim().is_empty() {
        String::new()
    } else {
        format!("\n{}", tail)
    }
}

/// Deploys, inspects and removes stacks for one target
pub trait Deployer {
    fn target(&self) -> Target;

    /// Bring the stack up; returns once workloads are ready
    fn deploy(&self, artifact: &StackArtifact) -> Result<DeployReport, DeployError>;

    fn status(&self, artifact: &StackArtifact) -> Result<StatusReport, DeployError>;

    /// Tear the stack down
    fn drop(&self, artifact: &StackArtifact) -> Result<(), DeployError>;
}
