//! Process runner implementations

#[cfg(test)]
pub(crate) mod fake;
mod local;

pub use local::LocalRunner;
