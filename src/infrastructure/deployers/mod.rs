//! Target deployers
//!
//! Each deployer drives one external tool through the process runner.
//!
//! ## Structure
//!
//! - `compose` - `docker compose` projects
//! - `kubernetes` - `kubectl` manifests plus port-forward tunnels

mod compose;
mod kubernetes;

pub use compose::ComposeDeployer;
pub use kubernetes::KubernetesDeployer;

use tracing::debug;

use crate::domain::ports::{
    CommandSpec, DeployError, LineHandler, ProcessOutput, ProcessRunner, StdioMode, StreamKind,
    STDERR_TAIL_LINES,
};

/// Run `spec` to completion.
///
/// A non-zero exit becomes `DeployError::Deployment` with the last stderr
/// lines attached. In capture mode each line is logged at debug.
pub(crate) fn execute(
    runner: &dyn ProcessRunner,
    spec: &CommandSpec,
    mode: StdioMode,
) -> Result<ProcessOutput, DeployError> {
    debug!(command = %spec, "running");
    let handler: Option<LineHandler> = match mode {
        StdioMode::Capture => {
            let program = spec.program.clone();
            Some(Box::new(move |kind: StreamKind, line: &str| match kind {
                StreamKind::Stdout => debug!(tool = %program, "{}", line),
                StreamKind::Stderr => debug!(tool = %program, stream = "stderr", "{}", line),
            }))
        }
        StdioMode::Inherit => None,
    };

    let handle = runner.spawn(spec, mode, handler)?;
    handle.wait().map_err(|failure| DeployError::Deployment {
        command: spec.to_string(),
        exit_code: failure.exit_code,
        stderr_tail: failure.stderr_tail(STDERR_TAIL_LINES),
    })
}
