//! Kubernetes deployer
//!
//! `apply` the artifact, wait on each deployment's rollout, then open a
//! port-forward per published port. The tunnel group is handed back to the
//! caller inside the report.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{
    CommandSpec, DeployError, DeployReport, Deployer, ProcessRunner, StackArtifact, StatusReport,
    StdioMode, TunnelSession,
};
use crate::domain::value_objects::Target;
use crate::infrastructure::tunnel::TunnelSupervisor;

use super::execute;

pub struct KubernetesDeployer {
    runner: Arc<dyn ProcessRunner>,
    program: String,
    namespace: Option<String>,
    rollout_timeout: String,
    failure_phrases: Vec<String>,
    stdio: StdioMode,
}

impl KubernetesDeployer {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        program: impl Into<String>,
        namespace: Option<String>,
        rollout_timeout: impl Into<String>,
        failure_phrases: Vec<String>,
        stdio: StdioMode,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            namespace,
            rollout_timeout: rollout_timeout.into(),
            failure_phrases,
            stdio,
        }
    }

    fn kubectl(&self) -> CommandSpec {
        let cmd = CommandSpec::new(&self.program);
        match &self.namespace {
            Some(namespace) => cmd.args(["-n", namespace.as_str()]),
            None => cmd,
        }
    }

    fn with_file(&self, verb: &str, artifact: &StackArtifact) -> CommandSpec {
        self.kubectl()
            .arg(verb)
            .arg("-f")
            .arg(artifact.path.display().to_string())
    }

    fn supervisor(&self) -> TunnelSupervisor {
        TunnelSupervisor::new(
            Arc::clone(&self.runner),
            &self.program,
            self.namespace.clone(),
            self.failure_phrases.clone(),
        )
    }
}

impl Deployer for KubernetesDeployer {
    fn target(&self) -> Target {
        Target::Kubernetes
    }

    fn deploy(&self, artifact: &StackArtifact) -> Result<DeployReport, DeployError> {
        execute(self.runner.as_ref(), &self.with_file("apply", artifact), self.stdio)?;

        for workload in &artifact.workloads {
            let rollout = self
                .kubectl()
                .args(["rollout", "status"])
                .arg(format!("deployment/{}", workload))
                .arg(format!("--timeout={}", self.rollout_timeout));
            execute(self.runner.as_ref(), &rollout, self.stdio)?;
            info!(workload = %workload, "rollout complete");
        }

        let tunnels = if artifact.tunnels.is_empty() {
            None
        } else {
            let group = self.supervisor().start(&artifact.tunnels)?;
            Some(Box::new(group) as Box<dyn TunnelSession>)
        };

        Ok(DeployReport {
            target: Target::Kubernetes,
            project: artifact.project.clone(),
            workloads: artifact.workloads.clone(),
            tunnels,
        })
    }

    fn status(&self, artifact: &StackArtifact) -> Result<StatusReport, DeployError> {
        let output = execute(
            self.runner.as_ref(),
            &self.with_file("get", artifact),
            StdioMode::Capture,
        )?;
        Ok(StatusReport {
            target: Target::Kubernetes,
            project: artifact.project.clone(),
            output: output.stdout,
        })
    }

    fn drop(&self, artifact: &StackArtifact) -> Result<(), DeployError> {
        let delete = self.with_file("delete", artifact).arg("--ignore-not-found");
        execute(self.runner.as_ref(), &delete, self.stdio)?;
        info!(project = %artifact.project, "manifests deleted");
        Ok(())
    }
}
