//! Whole-pipeline tests through the library API: parse, validate, resolve
//! and generate, without touching the filesystem.

use std::path::Path;

use microzoo::domain::entities::{Registry, StackDocument};
use microzoo::domain::services::{
    deployable_validator, diagram_validator, generate, generate_with, resolve, GenerateOptions,
};
use microzoo::domain::value_objects::ComponentId;
use microzoo::infrastructure::manifest::parse_descriptor;
use microzoo::{parse, Target};

const SERVICE: &str = r#"
image = "microzoo/go-service:latest"
upstream_env = "MICROZOO_UPSTREAMSERVICES"

[[ports]]
port = 8080
protocol = "http-rest"
"#;

const POSTGRES: &str = r#"
image = "postgres:16"

[[ports]]
port = 5432
protocol = "jdbc"

[bindings.jdbc]
MICROZOO_DB_HOST = "{host}"
MICROZOO_DB_PORT = "{port}"
MICROZOO_DB_NAME = "{id}"
"#;

const SHOP: &str = "@startuml
component Frontend <<service>> {
  publish = 8081
}
component Catalog <<service>> {
  replicas = 2
}
database CatalogDb
Frontend --> Catalog
Catalog --> CatalogDb : jdbc
@enduml
";

fn registry() -> Registry {
    let manifests = [
        ("service", "go-service", SERVICE),
        ("database", "postgres", POSTGRES),
    ]
    .into_iter()
    .map(|(category, name, content)| {
        parse_descriptor(Path::new("manifest.toml"), category, name, content)
            .unwrap()
            .0
    })
    .collect();
    Registry::from_manifests(manifests).unwrap()
}

fn shop() -> microzoo::domain::entities::ResolvedSystem {
    let raw = parse("shop", SHOP).unwrap();
    assert!(diagram_validator::validate(&raw).is_empty());
    let system = resolve(&raw, &registry()).unwrap();
    assert!(deployable_validator::validate(&system).is_empty());
    system
}

#[test]
fn upstreams_and_bindings_flow_into_environment() {
    let system = shop();

    let frontend = system.service(&ComponentId::from("frontend")).unwrap();
    let env = frontend.rendered_environment();
    assert_eq!(env["MICROZOO_UPSTREAMSERVICES"], "http://catalog:8080");

    let catalog = system.service(&ComponentId::from("catalog")).unwrap();
    assert_eq!(catalog.replicas, 2);
    assert_eq!(catalog.environment["MICROZOO_DB_HOST"], "catalogdb");
    assert_eq!(catalog.environment["MICROZOO_DB_PORT"], "5432");
    assert_eq!(catalog.environment["MICROZOO_DB_NAME"], "catalogdb");
    assert!(catalog.depends_on.contains(&ComponentId::from("catalogdb")));
}

#[test]
fn compose_document_mirrors_the_diagram() {
    let StackDocument::Compose(doc) = generate(&shop(), Target::Compose) else {
        panic!("expected a compose document");
    };

    assert_eq!(doc.name, "shop");
    let names: Vec<&str> = doc.services.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["frontend", "catalog", "catalogdb"]);

    let frontend = doc.service("frontend").unwrap();
    assert_eq!(frontend.ports, ["8081:8080"]);
    assert_eq!(frontend.depends_on, ["catalog"]);

    let catalog = doc.service("catalog").unwrap();
    assert!(catalog.ports.is_empty());
    assert_eq!(catalog.deploy.as_ref().map(|d| d.replicas), Some(2));
}

#[test]
fn orchestrator_document_pairs_workloads_with_exposures() {
    let options = GenerateOptions {
        namespace: Some("zoo".to_string()),
    };
    let StackDocument::Orchestrator(doc) = generate_with(&shop(), Target::Kubernetes, &options)
    else {
        panic!("expected an orchestrator document");
    };

    assert_eq!(doc.workloads.len(), 3);
    assert_eq!(doc.exposures.len(), 3);
    assert!(doc
        .workloads
        .iter()
        .all(|w| w.metadata.namespace.as_deref() == Some("zoo")));

    assert_eq!(doc.tunnels.len(), 1);
    assert_eq!(doc.tunnels[0].service.as_str(), "frontend");
    assert_eq!(doc.tunnels[0].local_port, 8081);
    assert_eq!(doc.tunnels[0].remote_port, 8080);

    let rendered = doc.render().unwrap();
    assert_eq!(rendered.matches("kind: Deployment").count(), 3);
}

#[test]
fn cycles_survive_resolution_and_fail_deployable_validation() {
    let raw = parse(
        "loop",
        "component A <<service>>\ncomponent B <<service>>\nA --> B\nB --> A\n",
    )
    .unwrap();
    let system = resolve(&raw, &registry()).unwrap();

    let errors = deployable_validator::validate(&system);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().starts_with("dependency cycle: a -> b -> a"));
}

/// The bundled manifests wire services the way the bundled images read
/// their configuration.
#[test]
fn bundled_components_match_service_environment_contract() {
    let components = Path::new(env!("CARGO_MANIFEST_DIR")).join("components");
    let registry = microzoo::infrastructure::manifest::load(&components).unwrap();

    let raw = parse(
        "reviews",
        "@startuml
component Catalog <<go-service>> {
  requestDelay = 5ms
  responseDelay = 10ms
  entityCount = 3
  payloadSize = 200
}
database CatalogDb <<postgres>>
database ReviewsDb <<mongodb>>
Catalog --> CatalogDb : jdbc
Catalog --> ReviewsDb : mongodb
@enduml
",
    )
    .unwrap();
    let system = resolve(&raw, &registry).unwrap();
    assert!(deployable_validator::validate(&system).is_empty());

    let catalog = system.service(&ComponentId::from("catalog")).unwrap();
    let env: Vec<String> = catalog
        .rendered_environment()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();

    insta::assert_snapshot!(env.join("\n"), @r"
    MICROZOO_DB_HOST=catalogdb
    MICROZOO_DB_NAME=catalogdb
    MICROZOO_DB_PASS=microzoo
    MICROZOO_DB_PORT=5432
    MICROZOO_DB_USER=microzoo
    MICROZOO_ENTITYCOUNT=3
    MICROZOO_MONGO_DBNAME=reviewsdb
    MICROZOO_MONGO_URI=mongodb://reviewsdb:27017
    MICROZOO_PAYLOADSIZE=200
    MICROZOO_REQUESTDELAY=5ms
    MICROZOO_RESPONSEDELAY=10ms
    MICROZOO_SERVICENAME=Catalog
    MICROZOO_UPSTREAMSERVICES=catalogdb:5432,reviewsdb:27017
    ");
}
