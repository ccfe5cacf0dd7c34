//! Domain Services
//!
//! The pure compilation stages: validate a diagram, resolve it against the
//! manifest registry, validate the deployable model, generate a stack.
//! Nothing here touches the file system or spawns processes.

pub mod deployable_validator;
pub mod diagram_validator;
mod resolver;
mod stack_generator;
mod validation;

pub use resolver::{resolve, UnresolvedComponentError, ENV_PROPERTY_PREFIX, RESERVED_PROPERTIES};
pub use stack_generator::{generate, generate_with, project, GenerateOptions, APP_LABEL, PART_OF_LABEL};
pub use validation::{ValidationError, ValidationReport, ValidationStage};
