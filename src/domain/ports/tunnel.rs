//! Tunnel Session Port
//!
//! A started group of port forwards. The Kubernetes deployer hands one back
//! from `deploy`; the command layer drives it until interrupted.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::TunnelSpec;

use super::process::LaunchError;

/// Lifecycle of one tunnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TunnelState {
    Starting,
    Running,
    Failed,
    Restarting,
    /// Terminal
    Stopped,
}

impl TunnelState {
    /// Legal transitions of the tunnel state machine
    pub fn can_transition_to(self, next: TunnelState) -> bool {
        use TunnelState::*;
        matches!(
            (self, next),
            (Starting, Running)
                | (Starting, Failed)
                | (Running, Failed)
                | (Failed, Restarting)
                | (Restarting, Running)
                | (Restarting, Failed)
                | (Starting | Running | Failed | Restarting, Stopped)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == TunnelState::Stopped
    }
}

impl fmt::Display for TunnelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TunnelState::Starting => "starting",
            TunnelState::Running => "running",
            TunnelState::Failed => "failed",
            TunnelState::Restarting => "restarting",
            TunnelState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// How a supervision loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuperviseOutcome {
    /// The interrupt flag was cleared; every tunnel has been stopped
    Interrupted,
    /// A tunnel failed and the whole group was stopped
    GroupFailed { tunnel: TunnelSpec, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TunnelError {
    #[error("tunnel failed: {tunnel}: {reason}")]
    Failed { tunnel: TunnelSpec, reason: String },

    #[error("tunnel failed: could not start port-forward for {tunnel}: {source}")]
    Launch {
        tunnel: TunnelSpec,
        #[source]
        source: LaunchError,
    },

    #[error("tunnel failed: group is stopped")]
    Stopped,
}

/// A running group of port forwards, stopped as a unit
pub trait TunnelSession: Send {
    /// Snapshot of every tunnel and its state, in start order
    fn states(&self) -> Vec<(TunnelSpec, TunnelState)>;

    /// Watch the group until a tunnel fails or `running` is cleared
    fn supervise(&mut self, running: &AtomicBool, poll: Duration) -> SuperviseOutcome;

    /// Handle pending tunnel events without blocking. `Some` once the group
    /// has failed.
    fn poll(&mut self) -> Option<SuperviseOutcome>;

    /// Re-spawn every tunnel after a group failure
    fn restart(&mut self) -> Result<(), TunnelError>;

    /// Kill every port-forward process; idempotent
    fn stop(&mut self);
}
