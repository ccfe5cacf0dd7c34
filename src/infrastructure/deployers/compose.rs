//! Compose deployer
//!
//! Every call addresses the stack by project name and file:
//! `docker compose -p <project> -f <file> <verb>`.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{
    CommandSpec, DeployError, DeployReport, Deployer, ProcessRunner, StackArtifact, StatusReport,
    StdioMode,
};
use crate::domain::value_objects::Target;

use super::execute;

pub struct ComposeDeployer {
    runner: Arc<dyn ProcessRunner>,
    program: String,
    stdio: StdioMode,
}

impl ComposeDeployer {
    pub fn new(runner: Arc<dyn ProcessRunner>, program: impl Into<String>, stdio: StdioMode) -> Self {
        Self {
            runner,
            program: program.into(),
            stdio,
        }
    }

    fn compose(&self, artifact: &StackArtifact) -> CommandSpec {
        CommandSpec::new(&self.program)
            .arg("compose")
            .args(["-p", artifact.project.as_str()])
            .arg("-f")
            .arg(artifact.path.display().to_string())
    }
}

impl Deployer for ComposeDeployer {
    fn target(&self) -> Target {
        Target::Compose
    }

    fn deploy(&self, artifact: &StackArtifact) -> Result<DeployReport, DeployError> {
        let up = self.compose(artifact).args(["up", "-d"]);
        execute(self.runner.as_ref(), &up, self.stdio)?;
        info!(project = %artifact.project, services = artifact.workloads.len(), "compose stack up");

        Ok(DeployReport {
            target: Target::Compose,
            project: artifact.project.clone(),
            workloads: artifact.workloads.clone(),
            tunnels: None,
        })
    }

    fn status(&self, artifact: &StackArtifact) -> Result<StatusReport, DeployError> {
        let ps = self.compose(artifact).arg("ps");
        let output = execute(self.runner.as_ref(), &ps, StdioMode::Capture)?;
        Ok(StatusReport {
            target: Target::Compose,
            project: artifact.project.clone(),
            output: output.stdout,
        })
    }

    fn drop(&self, artifact: &StackArtifact) -> Result<(), DeployError> {
        let down = self.compose(artifact).args(["down", "--remove-orphans"]);
        execute(self.runner.as_ref(), &down, self.stdio)?;
        info!(project = %artifact.project, "compose stack removed");
        Ok(())
    }
}
