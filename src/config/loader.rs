//! Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{ConfigError, Settings, KEYS};

/// Project-local config file name
pub const PROJECT_CONFIG: &str = "microzoo.toml";

/// Prefix of environment overrides (`MICROZOO_COMPOSE_CLI`, ...)
pub const ENV_PREFIX: &str = "MICROZOO_";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load settings and collect non-fatal warnings (unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(Settings, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let settings: Settings = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    settings.validate()?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((settings, warnings))
}

/// Load the explicit file, or the first of `./microzoo.toml` and the user
/// config, or defaults. Environment overrides are applied last.
pub fn load_or_default(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<(Settings, Vec<ConfigWarning>), ConfigError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let (settings, warnings) = load_with_warnings(path)?;
        return Ok((with_env_overrides(settings)?, warnings));
    }

    let candidates = std::iter::once(cwd.join(PROJECT_CONFIG))
        .chain(dirs_config_dir().map(|dir| dir.join("microzoo/config.toml")));
    for candidate in candidates {
        if candidate.exists() {
            debug!(path = %candidate.display(), "loading config");
            let (settings, warnings) = load_with_warnings(&candidate)?;
            return Ok((with_env_overrides(settings)?, warnings));
        }
    }

    Ok((with_env_overrides(Settings::default())?, Vec::new()))
}

/// Apply `MICROZOO_<KEY>` environment overrides
pub fn with_env_overrides(settings: Settings) -> Result<Settings, ConfigError> {
    with_overrides_from(settings, |name| std::env::var(name).ok())
}

/// Apply overrides from any variable source
pub fn with_overrides_from(
    mut settings: Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    for key in KEYS {
        let name = format!("{}{}", ENV_PREFIX, key.to_uppercase());
        if let Some(value) = lookup(&name) {
            debug!(variable = %name, "config override from environment");
            settings.set(key, value);
        }
    }
    settings.validate()?;
    Ok(settings)
}

/// Get XDG config directory
fn dirs_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

pub(crate) fn suggest_key(unknown: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in KEYS {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
