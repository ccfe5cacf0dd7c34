//! Resolved system - diagram components merged with their manifests

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::domain::value_objects::{ComponentId, Protocol};

/// Address of a service another service calls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Upstream {
    pub service: ComponentId,
    pub host: String,
    pub port: Option<u16>,
    pub protocol: Protocol,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.protocol.is_http() {
            f.write_str("http://")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

/// A container port of a resolved service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePort {
    pub target_port: u16,
    pub protocol: Protocol,
    /// Host port this container port is published on
    pub publish: Option<u16>,
}

/// A deployable unit: one diagram component after resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedService {
    pub id: ComponentId,
    pub name: String,
    pub kind: String,
    pub image: String,
    pub replicas: u32,
    pub ports: Vec<ServicePort>,
    pub environment: BTreeMap<String, String>,
    pub upstreams: Vec<Upstream>,
    /// Variable the upstream list is serialized into
    pub upstream_env: Option<String>,
    pub depends_on: BTreeSet<ComponentId>,
    pub required_env: Vec<String>,
}

impl ResolvedService {
    pub fn new(id: impl Into<ComponentId>, image: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            kind: String::new(),
            image: image.into(),
            replicas: 1,
            ports: Vec::new(),
            environment: BTreeMap::new(),
            upstreams: Vec::new(),
            upstream_env: None,
            depends_on: BTreeSet::new(),
            required_env: Vec::new(),
        }
    }

    pub fn with_port(mut self, target_port: u16, protocol: &str, publish: Option<u16>) -> Self {
        self.add_port(ServicePort {
            target_port,
            protocol: Protocol::new(protocol),
            publish,
        });
        self
    }

    pub fn with_dependency(mut self, id: impl Into<ComponentId>) -> Self {
        self.depends_on.insert(id.into());
        self
    }

    /// Add a port unless the same `(target_port, protocol)` pair exists
    pub fn add_port(&mut self, port: ServicePort) {
        let duplicate = self
            .ports
            .iter()
            .any(|p| p.target_port == port.target_port && p.protocol == port.protocol);
        if !duplicate {
            self.ports.push(port);
        }
    }

    /// Append an upstream unless an identical one is already recorded
    pub fn add_upstream(&mut self, upstream: Upstream) {
        if !self.upstreams.contains(&upstream) {
            self.upstreams.push(upstream);
        }
    }

    pub fn published_ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().filter_map(|p| p.publish)
    }

    /// Environment with the upstream list serialized in, as handed to images
    pub fn rendered_environment(&self) -> BTreeMap<String, String> {
        let mut env = self.environment.clone();
        if let Some(key) = &self.upstream_env {
            if !self.upstreams.is_empty() {
                let list = self
                    .upstreams
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                env.insert(key.clone(), list);
            }
        }
        env
    }
}

/// All resolved services of a diagram, in declaration order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResolvedSystem {
    pub name: String,
    pub services: Vec<ResolvedService>,
}

impl ResolvedSystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: ResolvedService) -> Self {
        self.services.push(service);
        self
    }

    pub fn id(&self) -> ComponentId {
        ComponentId::normalize(&self.name)
    }

    pub fn service(&self, id: &ComponentId) -> Option<&ResolvedService> {
        self.services.iter().find(|s| &s.id == id)
    }
}
