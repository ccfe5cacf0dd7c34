//! Common test utilities for microzoo CLI and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: an isolated working directory plus helpers to run the binary
//! - Fixtures: reusable manifests and diagrams

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
