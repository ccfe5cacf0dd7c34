//! Stack entities - target-specific projections of a resolved system
//!
//! `StackService` is the generation-ready shape shared by both targets.
//! The documents themselves differ per target:
//! - `compose` - one entry per service (image, env, ports and ordering together)
//! - `kubernetes` - a workload and a separate exposure per service

mod compose;
mod kubernetes;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ComponentId, Protocol, Target};

pub use compose::{ComposeDeploy, ComposeDocument, ComposeService};
pub use kubernetes::{
    Container, ContainerPort, DeploymentSpec, EnvVar, Exposure, LabelSelector, ObjectMeta,
    OrchestratorDocument, PodSpec, PodTemplate, ServicePortSpec, ServiceSpec, TemplateMeta,
    Workload,
};

/// Port mapping of a stack service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackPort {
    /// Externally reachable port; `None` keeps the port internal
    pub source_port: Option<u16>,
    /// Container-internal port
    pub target_port: u16,
    pub protocol: Protocol,
}

/// A service ready for a target serializer
#[derive(Debug, Clone, PartialEq)]
pub struct StackService {
    pub id: ComponentId,
    pub image: String,
    pub replicas: u32,
    /// Final environment, upstream list included
    pub environment: BTreeMap<String, String>,
    pub ports: Vec<StackPort>,
    /// Services that must start first, sorted
    pub depends_on: Vec<ComponentId>,
}

/// A local port forward to open once a stack is up
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TunnelSpec {
    pub service: ComponentId,
    pub local_port: u16,
    pub remote_port: u16,
}

impl std::fmt::Display for TunnelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}:{}", self.service, self.local_port, self.remote_port)
    }
}

/// A generated stack for one target
#[derive(Debug, Clone, PartialEq)]
pub enum StackDocument {
    Compose(ComposeDocument),
    Orchestrator(OrchestratorDocument),
}

impl StackDocument {
    pub fn target(&self) -> Target {
        match self {
            StackDocument::Compose(_) => Target::Compose,
            StackDocument::Orchestrator(_) => Target::Kubernetes,
        }
    }

    /// Stack (project) name
    pub fn name(&self) -> &str {
        match self {
            StackDocument::Compose(doc) => &doc.name,
            StackDocument::Orchestrator(doc) => &doc.name,
        }
    }

    /// Serialize to the YAML the target's tool consumes
    pub fn render(&self) -> Result<String, serde_yaml_ng::Error> {
        match self {
            StackDocument::Compose(doc) => serde_yaml_ng::to_string(doc),
            StackDocument::Orchestrator(doc) => doc.render(),
        }
    }

    /// Names of the deployable workloads, in declaration order
    pub fn workloads(&self) -> Vec<String> {
        match self {
            StackDocument::Compose(doc) => doc.services.iter().map(|(id, _)| id.clone()).collect(),
            StackDocument::Orchestrator(doc) => {
                doc.workloads.iter().map(|w| w.metadata.name.clone()).collect()
            }
        }
    }

    /// Port forwards the target needs to make published ports reachable
    pub fn tunnels(&self) -> Vec<TunnelSpec> {
        match self {
            StackDocument::Compose(_) => Vec::new(),
            StackDocument::Orchestrator(doc) => doc.tunnels.clone(),
        }
    }
}
