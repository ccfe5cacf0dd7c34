//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod component_id;
mod property;
mod protocol;
mod target;

pub use component_id::ComponentId;
pub use property::PropertyValue;
pub use protocol::{Protocol, DEFAULT_PROTOCOL};
pub use target::{Target, UnknownTargetError};
