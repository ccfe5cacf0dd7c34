//! Property tests for deployable-model validation.

use proptest::prelude::*;

use microzoo::domain::entities::{ResolvedService, ResolvedSystem};
use microzoo::domain::services::{deployable_validator, ValidationError};

/// Chain `s{n-1} -> ... -> s1 -> s0` plus random edges pointing downwards
fn layered(size: usize, extra: &[(usize, usize)]) -> Vec<ResolvedService> {
    let mut services: Vec<ResolvedService> = (0..size)
        .map(|i| ResolvedService::new(format!("s{i}").as_str(), "img"))
        .collect();
    for i in 1..size {
        services[i] = services[i].clone().with_dependency(format!("s{}", i - 1).as_str());
    }
    for &(a, b) in extra {
        let (from, to) = (a % size, b % size);
        if to < from {
            services[from] = services[from].clone().with_dependency(format!("s{to}").as_str());
        }
    }
    services
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: dependencies that only point to earlier services never form a cycle.
    #[test]
    fn property_layered_graph_is_acyclic(
        size in 1usize..8,
        extra in prop::collection::vec((0usize..8, 0usize..8), 0..12),
    ) {
        let mut system = ResolvedSystem::new("dag");
        system.services = layered(size, &extra);
        prop_assert!(deployable_validator::validate(&system).is_empty());
    }

    /// PROPERTY: one back edge closing the chain is reported as a cycle.
    #[test]
    fn property_back_edge_is_a_cycle(size in 2usize..8) {
        let mut services = layered(size, &[]);
        services[0] = services[0].clone().with_dependency(format!("s{}", size - 1).as_str());
        let mut system = ResolvedSystem::new("ring");
        system.services = services;

        let errors = deployable_validator::validate(&system);
        prop_assert_eq!(errors.len(), 1);
        let is_cycle = matches!(
            &errors[0],
            ValidationError::DependencyCycle { path } if path.len() == size + 1
        );
        prop_assert!(is_cycle);
    }
}
