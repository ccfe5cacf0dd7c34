//! microzoo - component diagrams to running container stacks
//!
//! microzoo reads a PlantUML-style component diagram, resolves each component
//! against reusable manifests, and generates a compose project or Kubernetes
//! manifests. It then drives `docker compose` or `kubectl` to deploy, inspect
//! and drop the stack, keeping port-forward tunnels alive on Kubernetes.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod parser;
pub mod presentation;

// Re-exports for convenience
pub use config::Settings;
pub use domain::value_objects::Target;
pub use error::{MicrozooError, MicrozooResult};
pub use parser::{parse, parse_file, ParseError};
