//! Deployable-model validator
//!
//! Checks a resolved system against the constraints a stack must satisfy:
//! unique ids, no published-port collisions, a sound and acyclic dependency
//! graph, a served port for every relation, and concrete values for every
//! required environment variable. `validate_for` adds the naming rules of
//! one deployment target.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::entities::{ResolvedService, ResolvedSystem};
use crate::domain::value_objects::{ComponentId, Target};

use super::validation::ValidationError;

/// Longest DNS-1123 label
const MAX_LABEL_LEN: usize = 63;

/// Collect every deployability violation in `system`
pub fn validate(system: &ResolvedSystem) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_unique_ids(system, &mut errors);
    check_port_collisions(system, &mut errors);
    check_dependencies(system, &mut errors);
    check_cycles(system, &mut errors);
    check_relation_ports(system, &mut errors);
    check_required_env(system, &mut errors);
    errors
}

/// `validate` plus the resource naming rules of `target`
pub fn validate_for(system: &ResolvedSystem, target: Target) -> Vec<ValidationError> {
    let mut errors = validate(system);
    check_names(system, target, &mut errors);
    errors
}

fn check_unique_ids(system: &ResolvedSystem, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for service in &system.services {
        if !seen.insert(&service.id) && reported.insert(&service.id) {
            errors.push(ValidationError::DuplicateService {
                id: service.id.clone(),
            });
        }
    }
}

fn check_port_collisions(system: &ResolvedSystem, errors: &mut Vec<ValidationError>) {
    let mut by_port: BTreeMap<u16, Vec<String>> = BTreeMap::new();
    for service in &system.services {
        for port in service.published_ports() {
            by_port.entry(port).or_default().push(service.id.to_string());
        }
    }

    for (port, services) in by_port {
        if services.len() > 1 {
            errors.push(ValidationError::PortCollision { port, services });
        }
    }
}

fn check_dependencies(system: &ResolvedSystem, errors: &mut Vec<ValidationError>) {
    let ids: HashSet<&ComponentId> = system.services.iter().map(|s| &s.id).collect();
    for service in &system.services {
        for dependency in &service.depends_on {
            if dependency == &service.id {
                errors.push(ValidationError::SelfDependency {
                    id: service.id.clone(),
                });
            } else if !ids.contains(dependency) {
                errors.push(ValidationError::UnknownDependency {
                    service: service.id.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Three-colour DFS over `depends_on`. Self edges and unknown targets are
/// reported by `check_dependencies` and skipped here.
fn check_cycles(system: &ResolvedSystem, errors: &mut Vec<ValidationError>) {
    let services: HashMap<&ComponentId, &ResolvedService> =
        system.services.iter().map(|s| (&s.id, s)).collect();
    let mut marks: HashMap<&ComponentId, Mark> =
        services.keys().map(|id| (*id, Mark::White)).collect();
    let mut reported: HashSet<Vec<String>> = HashSet::new();

    for service in &system.services {
        if marks.get(&service.id) == Some(&Mark::White) {
            let mut stack = Vec::new();
            visit(&service.id, &services, &mut marks, &mut stack, &mut reported, errors);
        }
    }
}

fn visit<'a>(
    id: &'a ComponentId,
    services: &HashMap<&'a ComponentId, &'a ResolvedService>,
    marks: &mut HashMap<&'a ComponentId, Mark>,
    stack: &mut Vec<&'a ComponentId>,
    reported: &mut HashSet<Vec<String>>,
    errors: &mut Vec<ValidationError>,
) {
    marks.insert(id, Mark::Grey);
    stack.push(id);

    if let Some(&service) = services.get(id) {
        for dependency in &service.depends_on {
            if dependency == id {
                continue;
            }
            match marks.get(dependency).copied() {
                Some(Mark::White) => visit(dependency, services, marks, stack, reported, errors),
                Some(Mark::Grey) => {
                    let start = stack.iter().position(|s| *s == dependency).unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|s| s.to_string()).collect();
                    path.push(dependency.to_string());
                    if reported.insert(canonical_cycle(&path)) {
                        errors.push(ValidationError::DependencyCycle { path });
                    }
                }
                Some(Mark::Black) | None => {}
            }
        }
    }

    stack.pop();
    marks.insert(id, Mark::Black);
}

/// Rotation-independent key for a cycle path (`a -> b -> a` == `b -> a -> b`)
fn canonical_cycle(path: &[String]) -> Vec<String> {
    let ring = &path[..path.len().saturating_sub(1)];
    let Some(min) = ring.iter().enumerate().min_by_key(|(_, s)| *s).map(|(i, _)| i) else {
        return Vec::new();
    };
    ring[min..].iter().chain(ring[..min].iter()).cloned().collect()
}

fn check_relation_ports(system: &ResolvedSystem, errors: &mut Vec<ValidationError>) {
    for service in &system.services {
        for upstream in service.upstreams.iter().filter(|u| u.port.is_none()) {
            errors.push(ValidationError::UnservedProtocol {
                service: service.id.clone(),
                target: upstream.service.clone(),
                protocol: upstream.protocol.to_string(),
            });
        }
    }
}

fn check_names(system: &ResolvedSystem, target: Target, errors: &mut Vec<ValidationError>) {
    let project = ComponentId::normalize(&system.name);
    let names = std::iter::once(project.as_str()).chain(
        system.services.iter().map(|s| s.id.as_str()),
    );
    // The first name is the project
    for (index, name) in names.enumerate() {
        let rule = match (target, index) {
            (Target::Compose, 0) => compose_project_rule(name),
            (Target::Compose, _) => compose_service_rule(name),
            (Target::Kubernetes, 0) => label_value_rule(name),
            (Target::Kubernetes, _) => dns_label_rule(name),
        };
        if let Err(reason) = rule {
            errors.push(ValidationError::InvalidName {
                name: name.to_string(),
                target,
                reason,
            });
        }
    }
}

/// RFC 1123 label: lower-case alphanumerics and `-`, alphanumeric at both ends
fn dns_label_rule(name: &str) -> Result<(), &'static str> {
    if name.is_empty() || name.len() > MAX_LABEL_LEN {
        return Err("must be 1 to 63 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("only lower-case letters, digits and '-' are allowed");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err("must start and end with a letter or digit");
    }
    Ok(())
}

/// Label values: up to 63 alphanumerics, `-`, `_` or `.`, alphanumeric at
/// both ends
fn label_value_rule(name: &str) -> Result<(), &'static str> {
    if name.is_empty() || name.len() > MAX_LABEL_LEN {
        return Err("must be 1 to 63 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("only letters, digits, '-', '_' and '.' are allowed");
    }
    if !name.starts_with(|c: char| c.is_ascii_alphanumeric())
        || !name.ends_with(|c: char| c.is_ascii_alphanumeric())
    {
        return Err("must start and end with a letter or digit");
    }
    Ok(())
}

/// Compose project names: lower-case alphanumerics, `-` and `_`, starting
/// with a letter or digit
fn compose_project_rule(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return Err("must start with a letter or digit"),
    }
    if chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_') {
        Ok(())
    } else {
        Err("only lower-case letters, digits, '-' and '_' are allowed")
    }
}

/// Compose service names: lower-case alphanumerics, `-`, `_` and `.`,
/// starting with a letter or digit
fn compose_service_rule(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return Err("must start with a letter or digit"),
    }
    if chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')) {
        Ok(())
    } else {
        Err("only lower-case letters, digits, '-', '_' and '.' are allowed")
    }
}

fn check_required_env(system: &ResolvedSystem, errors: &mut Vec<ValidationError>) {
    for service in &system.services {
        let environment = service.rendered_environment();
        for key in &service.required_env {
            match environment.get(key) {
                None => errors.push(ValidationError::MissingEnvironment {
                    service: service.id.clone(),
                    key: key.clone(),
                }),
                Some(value) if value.trim().is_empty() => {
                    errors.push(ValidationError::MissingEnvironment {
                        service: service.id.clone(),
                        key: key.clone(),
                    })
                }
                Some(value) if has_placeholder(value) => {
                    errors.push(ValidationError::UnexpandedEnvironment {
                        service: service.id.clone(),
                        key: key.clone(),
                        value: value.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }
}

fn has_placeholder(value: &str) -> bool {
    value
        .find('{')
        .map(|open| value[open..].contains('}'))
        .unwrap_or(false)
}
