//! Tunnel supervision for the orchestrator target

mod supervisor;

pub use supervisor::{TunnelGroup, TunnelSupervisor, READY_MARKER};
