//! Configuration module for microzoo
//!
//! Settings are layered, highest priority first:
//! 1. Environment variables (MICROZOO_*)
//! 2. The file named by `--config`, else `./microzoo.toml`,
//!    else the user config (`$XDG_CONFIG_HOME/microzoo/config.toml`)
//! 3. Built-in defaults

mod loader;
mod types;

pub use loader::{
    load_or_default, load_with_warnings, with_env_overrides, with_overrides_from, ConfigWarning,
    ENV_PREFIX, PROJECT_CONFIG,
};
pub use types::{ConfigError, Settings, DEFAULT_FAILURE_PHRASES, KEYS};
