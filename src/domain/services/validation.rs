//! Validation errors shared by the diagram and deployable-model validators

use std::fmt;

use thiserror::Error;

use crate::domain::value_objects::{ComponentId, Target};

/// A single structural or deployability violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("line {line}: relation endpoint '{endpoint}' does not name a declared component")]
    UnknownEndpoint { endpoint: ComponentId, line: usize },

    #[error("line {line}: component '{id}' has a relation to itself")]
    SelfLoop { id: ComponentId, line: usize },

    #[error("line {line}: component '{id}' has no kind (add a stereotype such as <<service>>)")]
    MissingKind { id: ComponentId, line: usize },

    #[error("component id '{id}' is declared twice (lines {first_line} and {line})")]
    DuplicateComponent {
        id: ComponentId,
        first_line: usize,
        line: usize,
    },

    #[error("service id '{id}' appears more than once")]
    DuplicateService { id: ComponentId },

    #[error("port {port} is published by more than one service: {}", .services.join(", "))]
    PortCollision { port: u16, services: Vec<String> },

    #[error("service '{service}' depends on unknown service '{dependency}'")]
    UnknownDependency {
        service: ComponentId,
        dependency: ComponentId,
    },

    #[error("service '{id}' depends on itself")]
    SelfDependency { id: ComponentId },

    #[error("dependency cycle: {}", .path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("service '{service}' reaches '{target}' over {protocol} but '{target}' exposes no {protocol} port")]
    UnservedProtocol {
        service: ComponentId,
        target: ComponentId,
        protocol: String,
    },

    #[error("'{name}' is not a valid {target} name: {reason}")]
    InvalidName {
        name: String,
        target: Target,
        reason: &'static str,
    },

    #[error("service '{service}' requires environment variable '{key}' but no value is set")]
    MissingEnvironment { service: ComponentId, key: String },

    #[error("service '{service}' environment variable '{key}' has an unexpanded placeholder: {value}")]
    UnexpandedEnvironment {
        service: ComponentId,
        key: String,
        value: String,
    },
}

/// Which validator produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    Diagram,
    Deployable,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStage::Diagram => f.write_str("diagram"),
            ValidationStage::Deployable => f.write_str("deployable model"),
        }
    }
}

/// All violations one validator found
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationReport {
    pub stage: ValidationStage,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// `Ok(())` for an empty list, otherwise the report as an error
    pub fn check(stage: ValidationStage, errors: Vec<ValidationError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { stage, errors })
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} check found {} problem{}",
            self.stage,
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" }
        )?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}
