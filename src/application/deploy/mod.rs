//! Deploy Module
//!
//! Hands compiled artifacts to a target deployer, and finds previously
//! written artifacts again for `status` and `drop`.
//!
//! ## Structure
//!
//! - `options` - `StoredStack` (where a compiled artifact lives)
//! - `use_case` - `DeployUseCase`
//!
//! ## Usage
//!
//! ```ignore
//! use microzoo::application::deploy::{DeployUseCase, StoredStack};
//!
//! let use_case = DeployUseCase::new(create_deployer(target, &settings, runner, stdio));
//! let report = use_case.execute(&compiled.artifact)?;
//! use_case.drop_stack(&StoredStack::new(".microzoo/stacks", "catalog", target))?;
//! ```

mod options;
mod use_case;

pub use options::StoredStack;
pub use use_case::DeployUseCase;
