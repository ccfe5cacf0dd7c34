//! Presentation Layer
//!
//! This layer handles:
//! - Creating deployers and use cases with infrastructure dependencies
//!
//! ## Structure
//!
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//!
//! ## Usage
//!
//! ```ignore
//! use microzoo::presentation::factory;
//!
//! let use_case = factory::create_deploy_use_case(target, &settings, StdioMode::Capture);
//! let report = use_case.execute(&artifact)?;
//! ```

pub mod factory;

pub use factory::{create_check_use_case, create_deploy_use_case, create_deployer};
