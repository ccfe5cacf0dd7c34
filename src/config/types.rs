//! Configuration types

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every recognised key, in file order
pub const KEYS: &[&str] = &[
    "compose_cli",
    "orchestrator_cli",
    "namespace",
    "rollout_timeout",
    "tunnel_failure_phrases",
    "probe_attempts",
    "probe_interval_ms",
    "probe_host",
];

/// Default stderr phrases that mark a port-forward as broken
pub const DEFAULT_FAILURE_PHRASES: &str =
    "lost connection to pod,an error occurred forwarding,unable to listen on";

/// Flat tool settings. Every value is a string in the file; typed accessors
/// parse on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Program providing `compose`
    pub compose_cli: String,
    /// Orchestrator client program
    pub orchestrator_cli: String,
    pub namespace: Option<String>,
    /// Passed to `rollout status --timeout`
    pub rollout_timeout: String,
    /// Comma-separated
    pub tunnel_failure_phrases: String,
    pub probe_attempts: String,
    pub probe_interval_ms: String,
    pub probe_host: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compose_cli: "docker".to_string(),
            orchestrator_cli: "kubectl".to_string(),
            namespace: None,
            rollout_timeout: "120s".to_string(),
            tunnel_failure_phrases: DEFAULT_FAILURE_PHRASES.to_string(),
            probe_attempts: "10".to_string(),
            probe_interval_ms: "1000".to_string(),
            probe_host: "127.0.0.1".to_string(),
        }
    }
}

impl Settings {
    /// Set a key by name; `false` for unknown keys
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        match key {
            "compose_cli" => self.compose_cli = value,
            "orchestrator_cli" => self.orchestrator_cli = value,
            "namespace" => {
                self.namespace = (!value.trim().is_empty()).then_some(value);
            }
            "rollout_timeout" => self.rollout_timeout = value,
            "tunnel_failure_phrases" => self.tunnel_failure_phrases = value,
            "probe_attempts" => self.probe_attempts = value,
            "probe_interval_ms" => self.probe_interval_ms = value,
            "probe_host" => self.probe_host = value,
            _ => return false,
        }
        true
    }

    pub fn failure_phrases(&self) -> Vec<String> {
        self.tunnel_failure_phrases
            .split(',')
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect()
    }

    pub fn probe_attempts(&self) -> Result<u32, ConfigError> {
        parse_number("probe_attempts", &self.probe_attempts)
    }

    pub fn probe_interval(&self) -> Result<Duration, ConfigError> {
        parse_number("probe_interval_ms", &self.probe_interval_ms).map(Duration::from_millis)
    }

    /// Check every typed value once, up front
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.probe_attempts()?;
        self.probe_interval()?;
        if !is_duration(&self.rollout_timeout) {
            return Err(ConfigError::InvalidValue {
                key: "rollout_timeout".to_string(),
                value: self.rollout_timeout.clone(),
                expected: "a duration such as 120s or 5m",
            });
        }
        for (key, value) in [
            ("compose_cli", &self.compose_cli),
            ("orchestrator_cli", &self.orchestrator_cli),
            ("probe_host", &self.probe_host),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    expected: "a non-empty value",
                });
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: "a whole number",
    })
}

/// `<digits><unit>` with unit one of `ms`, `s`, `m`, `h`
fn is_duration(value: &str) -> bool {
    let value = value.trim();
    let digits = value.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && matches!(&value[digits..], "ms" | "s" | "m" | "h")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or a non-string value
    #[error("invalid config {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("'{key}' must be {expected}, got '{value}'")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}
