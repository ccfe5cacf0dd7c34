//! Domain Layer
//!
//! The core of microzoo: the diagram model, the compile stages and the
//! interfaces deployers are written against.
//!
//! ## Structure
//!
//! - `entities/` - Raw, resolved and stack models, manifests and the registry
//! - `value_objects/` - Immutable value types (ComponentId, Protocol, Target)
//! - `services/` - Validators, resolver and stack generator
//! - `ports/` - Process runner, deployer and tunnel session traits
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or spawns processes
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
