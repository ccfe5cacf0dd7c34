//! Property tests for model resolution.

use std::path::Path;

use proptest::prelude::*;

use microzoo::domain::entities::Registry;
use microzoo::domain::services::resolve;
use microzoo::domain::value_objects::ComponentId;
use microzoo::infrastructure::manifest::parse_descriptor;
use microzoo::parse;

const SERVICE: &str = "image = \"svc\"\nupstream_env = \"UPSTREAMS\"\n\n[[ports]]\nport = 8080\n";

fn registry() -> Registry {
    let (manifest, _) =
        parse_descriptor(Path::new("manifest.toml"), "service", "go-service", SERVICE).unwrap();
    Registry::from_manifests(vec![manifest]).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every component resolves once and every relation becomes a dependency.
    #[test]
    fn property_relations_become_dependencies(
        size in 1usize..8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
    ) {
        let mut source = String::new();
        for i in 0..size {
            source.push_str(&format!("component S{i} <<service>>\n"));
        }
        let edges: Vec<(usize, usize)> = edges
            .into_iter()
            .map(|(a, b)| (a % size, b % size))
            .filter(|(a, b)| a != b)
            .collect();
        for (a, b) in &edges {
            source.push_str(&format!("S{a} --> S{b}\n"));
        }

        let raw = parse("generated", &source).unwrap();
        let system = resolve(&raw, &registry()).unwrap();
        prop_assert_eq!(system.services.len(), size);

        for (a, b) in &edges {
            let from = system.service(&ComponentId::from(format!("s{}", a).as_str())).unwrap();
            let target = format!("s{}", b);
            let target_id = ComponentId::from(target.as_str());
            prop_assert!(from.depends_on.contains(&target_id));
            prop_assert!(from.upstreams.iter().any(|u| u.host == target));
        }
    }
}
