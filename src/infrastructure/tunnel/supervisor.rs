//! Port-forward supervision
//!
//! One `kubectl port-forward` per published port. Line handlers run on the
//! runner's collector threads and only send events; every state change
//! happens on the control thread inside `poll`/`supervise`.
//!
//! A single failing tunnel stops the whole group. Restarting is explicit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::entities::TunnelSpec;
use crate::domain::ports::{
    CommandSpec, LineHandler, ProcessHandle, ProcessRunner, StdioMode, StreamKind,
    SuperviseOutcome, TunnelError, TunnelSession, TunnelState,
};

/// stdout marker printed once a forward is listening
pub const READY_MARKER: &str = "Forwarding from";

/// Starts tunnel groups
#[derive(Clone)]
pub struct TunnelSupervisor {
    runner: Arc<dyn ProcessRunner>,
    program: String,
    namespace: Option<String>,
    failure_phrases: Vec<String>,
}

impl TunnelSupervisor {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        program: impl Into<String>,
        namespace: Option<String>,
        failure_phrases: Vec<String>,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            namespace,
            failure_phrases: failure_phrases
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// `kubectl [-n ns] port-forward service/<id> <local>:<remote>`
    pub fn command(&self, spec: &TunnelSpec) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program);
        if let Some(namespace) = &self.namespace {
            cmd = cmd.args(["-n", namespace.as_str()]);
        }
        cmd.arg("port-forward")
            .arg(format!("service/{}", spec.service))
            .arg(format!("{}:{}", spec.local_port, spec.remote_port))
    }

    /// Spawn one tunnel per spec. If any spawn fails, the ones already
    /// running are stopped.
    pub fn start(&self, specs: &[TunnelSpec]) -> Result<TunnelGroup, TunnelError> {
        let (events_tx, events_rx) = mpsc::channel();
        let mut group = TunnelGroup {
            supervisor: self.clone(),
            tunnels: specs
                .iter()
                .map(|spec| Tunnel {
                    spec: spec.clone(),
                    state: TunnelState::Starting,
                    generation: 0,
                    handle: None,
                })
                .collect(),
            events_tx,
            events_rx,
            stopped: false,
        };

        for index in 0..group.tunnels.len() {
            if let Err(err) = group.spawn(index) {
                group.stop();
                return Err(err);
            }
        }
        info!(count = group.tunnels.len(), "tunnels started");
        Ok(group)
    }
}

#[derive(Debug)]
enum TunnelEvent {
    Ready {
        index: usize,
        generation: u64,
    },
    Failed {
        index: usize,
        generation: u64,
        reason: String,
    },
}

struct Tunnel {
    spec: TunnelSpec,
    state: TunnelState,
    /// Bumped on every spawn; events from older processes are ignored
    generation: u64,
    handle: Option<Box<dyn ProcessHandle>>,
}

impl Tunnel {
    fn transition(&mut self, next: TunnelState) {
        if self.state.can_transition_to(next) {
            debug!(tunnel = %self.spec, from = %self.state, to = %next, "tunnel state");
            self.state = next;
        }
    }

    fn is_live(&self) -> bool {
        matches!(
            self.state,
            TunnelState::Starting | TunnelState::Running | TunnelState::Restarting
        )
    }

    /// Kill and reap the current process
    fn terminate(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(err) = handle.kill_tree() {
                warn!(tunnel = %self.spec, error = %err, "failed to kill port-forward");
            }
            let _ = handle.wait();
        }
    }
}

/// A running set of tunnels that fail and stop together
pub struct TunnelGroup {
    supervisor: TunnelSupervisor,
    tunnels: Vec<Tunnel>,
    events_tx: Sender<TunnelEvent>,
    events_rx: Receiver<TunnelEvent>,
    stopped: bool,
}

impl TunnelGroup {
    fn spawn(&mut self, index: usize) -> Result<(), TunnelError> {
        let tunnel = &mut self.tunnels[index];
        tunnel.generation += 1;
        let handler = line_handler(
            index,
            tunnel.generation,
            self.events_tx.clone(),
            self.supervisor.failure_phrases.clone(),
        );
        let command = self.supervisor.command(&tunnel.spec);

        let handle = self
            .supervisor
            .runner
            .spawn(&command, StdioMode::Capture, Some(handler))
            .map_err(|source| TunnelError::Launch {
                tunnel: tunnel.spec.clone(),
                source,
            })?;
        debug!(tunnel = %tunnel.spec, pid = handle.pid(), "port-forward spawned");
        tunnel.handle = Some(handle);
        Ok(())
    }

    fn process_events(&mut self) -> Option<SuperviseOutcome> {
        if self.stopped {
            return None;
        }

        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                TunnelEvent::Ready { index, generation } => {
                    if let Some(tunnel) = self.tunnels.get_mut(index) {
                        if tunnel.generation == generation && tunnel.is_live() {
                            tunnel.transition(TunnelState::Running);
                            info!(tunnel = %tunnel.spec, "tunnel running");
                        }
                    }
                }
                TunnelEvent::Failed {
                    index,
                    generation,
                    reason,
                } => {
                    let current = self
                        .tunnels
                        .get(index)
                        .is_some_and(|t| t.generation == generation && t.is_live());
                    if current {
                        return Some(self.fail_group(index, reason));
                    }
                }
            }
        }

        let exited = self.tunnels.iter_mut().position(|t| {
            t.is_live() && t.handle.as_mut().is_some_and(|h| h.has_exited())
        });
        exited.map(|index| self.fail_group(index, "port-forward process exited".to_string()))
    }

    /// Mark `index` failed and stop every sibling
    fn fail_group(&mut self, index: usize, reason: String) -> SuperviseOutcome {
        let failed = self.tunnels[index].spec.clone();
        warn!(tunnel = %failed, reason = %reason, "tunnel failed; stopping group");

        for tunnel in &mut self.tunnels {
            tunnel.terminate();
            tunnel.transition(TunnelState::Failed);
        }
        SuperviseOutcome::GroupFailed {
            tunnel: failed,
            reason,
        }
    }
}

impl TunnelSession for TunnelGroup {
    fn states(&self) -> Vec<(TunnelSpec, TunnelState)> {
        self.tunnels
            .iter()
            .map(|t| (t.spec.clone(), t.state))
            .collect()
    }

    fn supervise(&mut self, running: &AtomicBool, poll: Duration) -> SuperviseOutcome {
        loop {
            if !running.load(Ordering::SeqCst) {
                info!("interrupted; stopping tunnels");
                self.stop();
                return SuperviseOutcome::Interrupted;
            }
            if let Some(outcome) = self.process_events() {
                return outcome;
            }
            thread::sleep(poll);
        }
    }

    fn poll(&mut self) -> Option<SuperviseOutcome> {
        self.process_events()
    }

    fn restart(&mut self) -> Result<(), TunnelError> {
        if self.stopped {
            return Err(TunnelError::Stopped);
        }
        // Drop stale events from the previous generation
        while self.events_rx.try_recv().is_ok() {}

        for index in 0..self.tunnels.len() {
            let tunnel = &mut self.tunnels[index];
            tunnel.terminate();
            tunnel.transition(TunnelState::Failed);
            tunnel.transition(TunnelState::Restarting);
            if let Err(err) = self.spawn(index) {
                self.fail_group(index, err.to_string());
                return Err(err);
            }
        }
        info!(count = self.tunnels.len(), "tunnels restarted");
        Ok(())
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        for tunnel in &mut self.tunnels {
            tunnel.terminate();
            tunnel.transition(TunnelState::Stopped);
        }
        self.stopped = true;
        info!("tunnels stopped");
    }
}

impl Drop for TunnelGroup {
    fn drop(&mut self) {
        self.stop();
    }
}

fn line_handler(
    index: usize,
    generation: u64,
    events: Sender<TunnelEvent>,
    failure_phrases: Vec<String>,
) -> LineHandler {
    let mut announced = false;
    Box::new(move |kind: StreamKind, line: &str| match kind {
        StreamKind::Stdout if !announced && line.contains(READY_MARKER) => {
            announced = true;
            let _ = events.send(TunnelEvent::Ready { index, generation });
        }
        StreamKind::Stderr => {
            let lower = line.to_lowercase();
            if failure_phrases.iter().any(|p| lower.contains(p.as_str())) {
                let _ = events.send(TunnelEvent::Failed {
                    index,
                    generation,
                    reason: line.trim().to_string(),
                });
            }
        }
        StreamKind::Stdout => {}
    })
}
