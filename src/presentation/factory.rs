//! Use Case Factory
//!
//! Creates deployers and use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::Arc;

use crate::application::{CheckUseCase, DeployUseCase};
use crate::config::{ConfigError, Settings};
use crate::domain::ports::{Deployer, ProcessRunner, StdioMode};
use crate::domain::value_objects::Target;
use crate::infrastructure::{ComposeDeployer, KubernetesDeployer, LocalRunner, TcpProbe};

/// Build the deployer for `target` from settings
pub fn create_deployer(
    target: Target,
    settings: &Settings,
    runner: Arc<dyn ProcessRunner>,
    stdio: StdioMode,
) -> Box<dyn Deployer> {
    match target {
        Target::Compose => Box::new(ComposeDeployer::new(runner, &settings.compose_cli, stdio)),
        Target::Kubernetes => Box::new(KubernetesDeployer::new(
            runner,
            &settings.orchestrator_cli,
            settings.namespace.clone(),
            &settings.rollout_timeout,
            settings.failure_phrases(),
            stdio,
        )),
    }
}

/// Create a deploy use case running tools on this machine
pub fn create_deploy_use_case(target: Target, settings: &Settings, stdio: StdioMode) -> DeployUseCase {
    let runner: Arc<dyn ProcessRunner> = Arc::new(LocalRunner::new());
    DeployUseCase::new(create_deployer(target, settings, runner, stdio))
}

/// Create a check use case probing `probe_host`
pub fn create_check_use_case(settings: &Settings) -> Result<CheckUseCase, ConfigError> {
    let probe = TcpProbe::new(
        &settings.probe_host,
        settings.probe_attempts()?,
        settings.probe_interval()?,
    );
    Ok(CheckUseCase::new(probe))
}
