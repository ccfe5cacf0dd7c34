//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `CompileUseCase` - diagram to validated stack artifact
//! - `DeployUseCase` - deploy an artifact; query or drop a stored one
//! - `CheckUseCase` - probe published ports after a deployment

pub mod check;
pub mod compile;
pub mod deploy;
pub mod source;

pub use check::{CheckItem, CheckResult, CheckUseCase};
pub use compile::{CompileOptions, CompileResult, CompileUseCase};
pub use deploy::{DeployUseCase, StoredStack};
pub use source::{diagram_id, resolve_diagram, DIAGRAM_EXTENSIONS};
