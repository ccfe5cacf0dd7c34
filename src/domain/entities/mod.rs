//! Domain Entities
//!
//! The structures each compile stage produces:
//! - `RawSystem` - the parsed diagram
//! - `ComponentManifest` / `Registry` - reusable component descriptions
//! - `ResolvedSystem` - components merged with manifests and relations
//! - `StackDocument` - the target-specific artifact

mod manifest;
mod raw_system;
mod resolved;
pub mod stack;

pub use manifest::{ComponentManifest, ManifestError, ManifestPort, Registry};
pub use raw_system::{RawComponent, RawRelation, RawSystem};
pub use resolved::{ResolvedService, ResolvedSystem, ServicePort, Upstream};
pub use stack::{StackDocument, StackPort, StackService, TunnelSpec};
