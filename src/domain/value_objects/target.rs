//! Target value object - which orchestration backend a stack is generated for

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deployment target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Compose-style service set, run by the container CLI's `compose` plugin
    #[default]
    Compose,
    /// Orchestrator manifests (Deployments + Services), applied with kubectl
    Kubernetes,
}

/// Raised when a target identifier is not in [`Target::IDENTIFIERS`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown target '{identifier}' (expected one of: {expected})")]
pub struct UnknownTargetError {
    pub identifier: String,
    pub expected: String,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Compose, Target::Kubernetes];

    /// Static identifier table; every spelling a user may type
    pub const IDENTIFIERS: &'static [(&'static str, Target)] = &[
        ("compose", Target::Compose),
        ("docker-compose", Target::Compose),
        ("kubernetes", Target::Kubernetes),
        ("k8s", Target::Kubernetes),
    ];

    /// Canonical identifier, also used in artifact file names
    pub fn identifier(&self) -> &'static str {
        match self {
            Target::Compose => "compose",
            Target::Kubernetes => "kubernetes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Target::Compose => "Compose",
            Target::Kubernetes => "Kubernetes",
        }
    }
}

impl FromStr for Target {
    type Err = UnknownTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::IDENTIFIERS
            .iter()
            .find(|(id, _)| *id == needle)
            .map(|(_, target)| *target)
            .ok_or_else(|| UnknownTargetError {
                identifier: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|t| t.identifier())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
