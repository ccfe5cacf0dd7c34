//! Deploy Use Case
//!
//! Thin orchestration over a `Deployer`: deploy a fresh artifact, or load a
//! stored one and query or remove it. Stored artifacts are never recompiled.

use tracing::{debug, info};

use crate::domain::ports::{DeployReport, Deployer, StackArtifact, StatusReport};
use crate::error::MicrozooResult;
use crate::infrastructure::artifact;

use super::options::StoredStack;

pub struct DeployUseCase {
    deployer: Box<dyn Deployer>,
}

impl DeployUseCase {
    pub fn new(deployer: Box<dyn Deployer>) -> Self {
        Self { deployer }
    }

    /// Bring `artifact` up. On the orchestrator target the report carries the
    /// running tunnel group.
    pub fn execute(&self, artifact: &StackArtifact) -> MicrozooResult<DeployReport> {
        info!(
            target = %self.deployer.target(),
            project = %artifact.project,
            artifact = %artifact.path.display(),
            "deploying"
        );
        let report = self.deployer.deploy(artifact)?;
        debug!(workloads = report.workloads.len(), "deployed");
        Ok(report)
    }

    pub fn status(&self, stored: &StoredStack) -> MicrozooResult<StatusReport> {
        let artifact = self.load(stored)?;
        Ok(self.deployer.status(&artifact)?)
    }

    /// Tear down a stored stack; returns the artifact that was dropped
    pub fn drop_stack(&self, stored: &StoredStack) -> MicrozooResult<StackArtifact> {
        let artifact = self.load(stored)?;
        Deployer::drop(self.deployer.as_ref(), &artifact)?;
        info!(project = %artifact.project, "stack dropped");
        Ok(artifact)
    }

    fn load(&self, stored: &StoredStack) -> MicrozooResult<StackArtifact> {
        let artifact = artifact::load(&stored.out, &stored.id(), stored.target)?;
        debug!(artifact = %artifact.path.display(), "loaded stored artifact");
        Ok(artifact)
    }
}
