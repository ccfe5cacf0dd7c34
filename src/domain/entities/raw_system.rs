//! Raw system - the diagram as parsed, before any manifest is consulted

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::value_objects::{ComponentId, PropertyValue, Protocol};

/// One declared component (node) of a diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawComponent {
    pub id: ComponentId,
    /// Display name as written in the diagram
    pub name: String,
    /// Stereotype, or the kind implied by the declaration keyword
    pub kind: String,
    pub alias: Option<String>,
    pub properties: BTreeMap<String, PropertyValue>,
    /// 1-indexed line of the declaration (0 for programmatic components)
    pub line: usize,
}

impl RawComponent {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ComponentId::normalize(&name),
            name,
            kind: kind.into(),
            alias: None,
            properties: BTreeMap::new(),
            line: 0,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// A directed, protocol-tagged edge between two components
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRelation {
    pub source: ComponentId,
    pub target: ComponentId,
    pub protocol: Protocol,
    pub label: Option<String>,
    pub line: usize,
}

impl RawRelation {
    pub fn new(source: impl Into<ComponentId>, target: impl Into<ComponentId>, protocol: &str) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            protocol: Protocol::new(protocol),
            label: None,
            line: 0,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Components in declaration order plus the relations between them
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RawSystem {
    /// Diagram identifier (file stem, or the name passed to the parser)
    pub name: String,
    pub components: Vec<RawComponent>,
    pub relations: Vec<RawRelation>,
}

impl RawSystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: RawComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_relation(mut self, relation: RawRelation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Normalized diagram id, used for artifact paths and stack names
    pub fn id(&self) -> ComponentId {
        ComponentId::normalize(&self.name)
    }

    pub fn component(&self, id: &ComponentId) -> Option<&RawComponent> {
        self.components.iter().find(|c| &c.id == id)
    }

    /// Relations leaving `id`, in declaration order
    pub fn outgoing<'a>(&'a self, id: &'a ComponentId) -> impl Iterator<Item = &'a RawRelation> + 'a {
        self.relations.iter().filter(move |r| &r.source == id)
    }
}
