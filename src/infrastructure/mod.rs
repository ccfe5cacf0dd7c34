//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `manifest/` - component registry loaded from descriptor directories
//! - `process/` - process runner (local, plus a scripted fake for tests)
//! - `tunnel/` - port-forward supervision
//! - `deployers/` - compose and kubernetes deployers
//! - `artifact` - stack file storage
//! - `probe` - TCP reachability checks

pub mod artifact;
pub mod deployers;
pub mod manifest;
pub mod probe;
pub mod process;
pub mod tunnel;

// Re-export for convenience
pub use deployers::{ComposeDeployer, KubernetesDeployer};
pub use probe::{ProbeError, TcpProbe};
pub use process::LocalRunner;
pub use tunnel::{TunnelGroup, TunnelSupervisor};
