//! Compile Module
//!
//! Runs the diagram through every compile stage and writes the stack artifact.
//!
//! ## Structure
//!
//! - `options` - `CompileOptions`
//! - `use_case` - `CompileUseCase` and its `CompileResult`
//!
//! ## Usage
//!
//! ```ignore
//! use microzoo::application::compile::{CompileOptions, CompileUseCase};
//!
//! let result = CompileUseCase::new().execute(&CompileOptions::new("catalog"))?;
//! println!("{}", result.artifact.path.display());
//! ```

mod options;
mod use_case;

pub use options::CompileOptions;
pub use use_case::{CompileResult, CompileUseCase};
