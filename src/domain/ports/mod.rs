//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deployer;
pub mod process;
pub mod tunnel;

pub use deployer::{
    DeployError, DeployReport, Deployer, StackArtifact, StatusReport, STDERR_TAIL_LINES,
};
pub use process::{
    CommandSpec, LaunchError, LineHandler, ProcessFailure, ProcessHandle, ProcessOutput,
    ProcessRunner, StdioMode, StreamKind,
};
pub use tunnel::{SuperviseOutcome, TunnelError, TunnelSession, TunnelState};
