//! Check Use Case
//!
//! Post-deployment probes: every published port of the resolved system must
//! accept a TCP connection. On the orchestrator target the ports are reached
//! through the tunnel group, which is polled between attempts so a failed
//! group ends the run instead of burning through retries. Clearing the
//! `running` flag ends every remaining probe the same way.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::entities::ResolvedSystem;
use crate::domain::ports::{SuperviseOutcome, TunnelSession};
use crate::domain::value_objects::ComponentId;
use crate::error::MicrozooError;
use crate::infrastructure::{ProbeError, TcpProbe};

/// One probed port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub service: ComponentId,
    pub port: u16,
    /// Attempts used on success
    pub outcome: Result<u32, ProbeError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub items: Vec<CheckItem>,
}

impl CheckResult {
    pub fn is_success(&self) -> bool {
        self.items.iter().all(|item| item.outcome.is_ok())
    }

    /// Some probe was cut short by an interrupt
    pub fn was_interrupted(&self) -> bool {
        self.items.iter().any(|item| {
            matches!(&item.outcome, Err(ProbeError::Aborted { reason, .. }) if reason == INTERRUPTED)
        })
    }

    pub fn passed(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_ok()).count()
    }

    /// `ProbeFailed` listing every failing port, or `None` when all passed
    pub fn into_error(self) -> Option<MicrozooError> {
        let failures: Vec<String> = self
            .items
            .into_iter()
            .filter_map(|item| {
                item.outcome
                    .err()
                    .map(|err| format!("{}: {}", item.service, err))
            })
            .collect();
        (!failures.is_empty()).then_some(MicrozooError::ProbeFailed { failures })
    }
}

/// Abort reason once the run is interrupted
pub const INTERRUPTED: &str = "interrupted";

pub struct CheckUseCase {
    probe: TcpProbe,
}

impl CheckUseCase {
    pub fn new(probe: TcpProbe) -> Self {
        Self { probe }
    }

    /// Probe every published port in declaration order
    pub fn execute(
        &self,
        system: &ResolvedSystem,
        mut tunnels: Option<&mut dyn TunnelSession>,
        running: &AtomicBool,
    ) -> CheckResult {
        let mut group_failure: Option<String> = None;
        let mut items = Vec::new();

        for service in &system.services {
            for port in service.published_ports() {
                let outcome = self.probe.wait_for(port, || {
                    if !running.load(Ordering::SeqCst) {
                        return Some(INTERRUPTED.to_string());
                    }
                    if group_failure.is_none() {
                        if let Some(SuperviseOutcome::GroupFailed { tunnel, reason }) =
                            tunnels.as_mut().and_then(|t| t.poll())
                        {
                            group_failure = Some(format!("tunnel {} failed: {}", tunnel, reason));
                        }
                    }
                    group_failure.clone()
                });
                items.push(CheckItem {
                    service: service.id.clone(),
                    port,
                    outcome,
                });
            }
        }

        CheckResult { items }
    }
}
