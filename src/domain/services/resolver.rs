//! Model resolver
//!
//! Folds each raw component together with its manifest and its outgoing
//! relations into a `ResolvedService`. Resolution is a pure fold: it never
//! rejects cycles or collisions, that is the deployable validator's job.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::domain::entities::{
    ComponentManifest, RawComponent, RawRelation, RawSystem, Registry, ResolvedService,
    ResolvedSystem, ServicePort, Upstream,
};
use crate::domain::value_objects::{ComponentId, PropertyValue};

/// Properties the resolver consumes itself instead of mapping to environment
pub const RESERVED_PROPERTIES: &[&str] = &["image", "replicas", "publish"];

/// Prefix of properties copied verbatim into the environment
pub const ENV_PROPERTY_PREFIX: &str = "env.";

/// A component whose kind has no manifest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("component '{id}' has kind '{kind}' but no manifest provides it")]
pub struct UnresolvedComponentError {
    pub id: ComponentId,
    pub kind: String,
}

/// Merge a raw system with registry data.
pub fn resolve(
    system: &RawSystem,
    registry: &Registry,
) -> Result<ResolvedSystem, UnresolvedComponentError> {
    // Every manifest is fetched up front so relation folding can read the
    // target's ports and bindings.
    let mut manifests: BTreeMap<&ComponentId, &ComponentManifest> = BTreeMap::new();
    for component in &system.components {
        let manifest = registry
            .lookup(&component.kind)
            .ok_or_else(|| UnresolvedComponentError {
                id: component.id.clone(),
                kind: component.kind.clone(),
            })?;
        manifests.insert(&component.id, manifest);
    }

    let services = system
        .components
        .iter()
        .map(|component| {
            let manifest = manifests[&component.id];
            let mut service = seed_service(component, manifest);
            for relation in system.outgoing(&component.id) {
                fold_relation(&mut service, relation, system, &manifests);
            }
            debug!(
                service = %service.id,
                image = %service.image,
                upstreams = service.upstreams.len(),
                "resolved component"
            );
            service
        })
        .collect();

    Ok(ResolvedSystem {
        name: system.name.clone(),
        services,
    })
}

fn seed_service(component: &RawComponent, manifest: &ComponentManifest) -> ResolvedService {
    let image = match component.property("image") {
        Some(value) => value.to_string(),
        None => manifest.image.clone(),
    };

    let replicas = component
        .property("replicas")
        .and_then(PropertyValue::as_integer)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1);

    let publish_override = component
        .property("publish")
        .and_then(PropertyValue::as_integer)
        .and_then(|n| u16::try_from(n).ok());

    let mut service = ResolvedService {
        id: component.id.clone(),
        name: component.name.clone(),
        kind: component.kind.clone(),
        image,
        replicas,
        ports: Vec::new(),
        environment: BTreeMap::new(),
        upstreams: Vec::new(),
        upstream_env: manifest.upstream_env.clone(),
        depends_on: Default::default(),
        required_env: manifest.required_env.clone(),
    };

    for (i, port) in manifest.ports.iter().enumerate() {
        let publish = match (i, publish_override) {
            (0, Some(p)) => Some(p),
            _ => port.publish,
        };
        service.add_port(ServicePort {
            target_port: port.port,
            protocol: port.protocol.clone(),
            publish,
        });
    }

    let placeholders = [
        ("id", component.id.to_string()),
        ("name", component.name.clone()),
        ("kind", component.kind.clone()),
    ];
    for (key, template) in &manifest.environment {
        service
            .environment
            .insert(key.clone(), expand(template, &placeholders));
    }

    for (key, value) in &component.properties {
        if let Some(env_key) = key.strip_prefix(ENV_PROPERTY_PREFIX) {
            service.environment.insert(env_key.to_string(), value.to_string());
        } else if let Some(env_key) = manifest.properties.get(key) {
            service.environment.insert(env_key.clone(), value.to_string());
        } else if !RESERVED_PROPERTIES.contains(&key.as_str()) {
            debug!(
                component = %component.id,
                property = %key,
                kind = %manifest.qualified_name(),
                "property not used by manifest; ignoring"
            );
        }
    }

    service
}

fn fold_relation(
    service: &mut ResolvedService,
    relation: &RawRelation,
    system: &RawSystem,
    manifests: &BTreeMap<&ComponentId, &ComponentManifest>,
) {
    // Endpoints were checked by the diagram validator; an unknown target
    // contributes nothing here.
    let (Some(target), Some(target_manifest)) = (
        system.component(&relation.target),
        manifests.get(&relation.target),
    ) else {
        return;
    };

    service.depends_on.insert(target.id.clone());

    // `None` when the target exposes nothing for this protocol; the
    // deployable validator reports it
    let port = target_manifest.port_for(&relation.protocol).map(|p| p.port);

    service.add_upstream(Upstream {
        service: target.id.clone(),
        host: target.id.to_string(),
        port,
        protocol: relation.protocol.clone(),
    });

    if let Some(binding) = target_manifest.binding(&relation.protocol) {
        let placeholders = [
            ("host", target.id.to_string()),
            ("port", port.map(|p| p.to_string()).unwrap_or_default()),
            ("id", target.id.to_string()),
            ("name", target.name.clone()),
        ];
        for (key, template) in binding {
            service
                .environment
                .insert(key.clone(), expand(template, &placeholders));
        }
    }
}

/// Replace `{name}` placeholders; unknown placeholders are left in place
fn expand(template: &str, placeholders: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in placeholders {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}
