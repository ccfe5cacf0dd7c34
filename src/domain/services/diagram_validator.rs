//! Diagram validator
//!
//! Structural checks on a raw system before any manifest is consulted.
//! Each check runs independently and every violation is reported.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::RawSystem;
use crate::domain::value_objects::ComponentId;

use super::validation::ValidationError;

/// Check a raw system for well-formedness.
///
/// Never mutates its input; an empty list means the diagram is sound.
pub fn validate(system: &RawSystem) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_duplicate_ids(system, &mut errors);
    check_kinds(system, &mut errors);
    check_relations(system, &mut errors);
    errors
}

fn check_duplicate_ids(system: &RawSystem, errors: &mut Vec<ValidationError>) {
    let mut seen: HashMap<&ComponentId, usize> = HashMap::new();
    for component in &system.components {
        match seen.get(&component.id) {
            Some(&first_line) => errors.push(ValidationError::DuplicateComponent {
                id: component.id.clone(),
                first_line,
                line: component.line,
            }),
            None => {
                seen.insert(&component.id, component.line);
            }
        }
    }
}

fn check_kinds(system: &RawSystem, errors: &mut Vec<ValidationError>) {
    for component in &system.components {
        if component.kind.trim().is_empty() {
            errors.push(ValidationError::MissingKind {
                id: component.id.clone(),
                line: component.line,
            });
        }
    }
}

fn check_relations(system: &RawSystem, errors: &mut Vec<ValidationError>) {
    let ids: HashSet<&ComponentId> = system.components.iter().map(|c| &c.id).collect();

    for relation in &system.relations {
        for endpoint in [&relation.source, &relation.target] {
            if !ids.contains(endpoint) {
                errors.push(ValidationError::UnknownEndpoint {
                    endpoint: endpoint.clone(),
                    line: relation.line,
                });
            }
            // Self-loops only report once
            if relation.is_self_loop() {
                break;
            }
        }

        if relation.is_self_loop() {
            errors.push(ValidationError::SelfLoop {
                id: relation.source.clone(),
                line: relation.line,
            });
        }
    }
}
