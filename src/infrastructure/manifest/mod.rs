//! Manifest registry loading

mod loader;

pub use loader::{load, parse_descriptor, DESCRIPTOR_FILE};
