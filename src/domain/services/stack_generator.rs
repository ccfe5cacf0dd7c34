//! Stack generator
//!
//! Projects a validated `ResolvedSystem` into a target document. Both targets
//! start from the same `StackService` projection; their output shapes differ:
//! compose keeps image, ports and ordering in one entry per service, the
//! orchestrator splits each service into a workload and an exposure.

use std::collections::BTreeMap;

use crate::domain::entities::stack::{
    ComposeDeploy, ComposeDocument, ComposeService, Container, ContainerPort, DeploymentSpec,
    EnvVar, Exposure, LabelSelector, ObjectMeta, OrchestratorDocument, PodSpec, PodTemplate,
    ServicePortSpec, ServiceSpec, TemplateMeta, Workload,
};
use crate::domain::entities::{
    ResolvedService, ResolvedSystem, StackDocument, StackPort, StackService, TunnelSpec,
};
use crate::domain::value_objects::Target;

/// Label every orchestrator object carries to identify its service
pub const APP_LABEL: &str = "app";
/// Label tying orchestrator objects to their stack
pub const PART_OF_LABEL: &str = "app.kubernetes.io/part-of";

/// Knobs that affect generated output but not the model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Namespace for orchestrator objects
    pub namespace: Option<String>,
}

/// Generate the stack document for `target` with default options
pub fn generate(system: &ResolvedSystem, target: Target) -> StackDocument {
    generate_with(system, target, &GenerateOptions::default())
}

pub fn generate_with(
    system: &ResolvedSystem,
    target: Target,
    options: &GenerateOptions,
) -> StackDocument {
    let services: Vec<StackService> = system.services.iter().map(project).collect();
    let name = system.id().to_string();

    match target {
        Target::Compose => StackDocument::Compose(compose(name, &services)),
        Target::Kubernetes => {
            StackDocument::Orchestrator(orchestrator(name, &services, options.namespace.clone()))
        }
    }
}

/// Generation-ready shape of one resolved service.
///
/// Ports are unique by number: the first protocol declared on a number names
/// it, and the first host port declared for it publishes it.
pub fn project(service: &ResolvedService) -> StackService {
    let mut ports: Vec<StackPort> = Vec::with_capacity(service.ports.len());
    for port in &service.ports {
        match ports.iter_mut().find(|p| p.target_port == port.target_port) {
            Some(existing) => {
                existing.source_port = existing.source_port.or(port.publish);
            }
            None => ports.push(StackPort {
                source_port: port.publish,
                target_port: port.target_port,
                protocol: port.protocol.clone(),
            }),
        }
    }

    StackService {
        id: service.id.clone(),
        image: service.image.clone(),
        replicas: service.replicas,
        environment: service.rendered_environment(),
        ports,
        depends_on: service.depends_on.iter().cloned().collect(),
    }
}

fn compose(name: String, services: &[StackService]) -> ComposeDocument {
    let services = services
        .iter()
        .map(|service| {
            let ports = service
                .ports
                .iter()
                .filter_map(|p| p.source_port.map(|source| format!("{}:{}", source, p.target_port)))
                .collect();
            let expose = service
                .ports
                .iter()
                .filter(|p| p.source_port.is_none())
                .map(|p| p.target_port.to_string())
                .collect();
            let entry = ComposeService {
                image: service.image.clone(),
                environment: service.environment.clone(),
                ports,
                expose,
                depends_on: service.depends_on.iter().map(ToString::to_string).collect(),
                deploy: (service.replicas != 1).then_some(ComposeDeploy {
                    replicas: service.replicas,
                }),
            };
            (service.id.to_string(), entry)
        })
        .collect();

    ComposeDocument { name, services }
}

fn orchestrator(
    name: String,
    services: &[StackService],
    namespace: Option<String>,
) -> OrchestratorDocument {
    let mut workloads = Vec::with_capacity(services.len());
    let mut exposures = Vec::new();
    let mut tunnels = Vec::new();

    for service in services {
        let id = service.id.to_string();
        let selector = BTreeMap::from([(APP_LABEL.to_string(), id.clone())]);
        let mut labels = selector.clone();
        labels.insert(PART_OF_LABEL.to_string(), name.clone());

        let metadata = ObjectMeta {
            name: id.clone(),
            namespace: namespace.clone(),
            labels: labels.clone(),
        };

        workloads.push(Workload {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            metadata: metadata.clone(),
            spec: DeploymentSpec {
                replicas: service.replicas,
                selector: LabelSelector {
                    match_labels: selector.clone(),
                },
                template: PodTemplate {
                    metadata: TemplateMeta { labels },
                    spec: PodSpec {
                        containers: vec![Container {
                            name: id.clone(),
                            image: service.image.clone(),
                            env: service
                                .environment
                                .iter()
                                .map(|(name, value)| EnvVar {
                                    name: name.clone(),
                                    value: value.clone(),
                                })
                                .collect(),
                            ports: service
                                .ports
                                .iter()
                                .map(|p| ContainerPort {
                                    name: port_name(p),
                                    container_port: p.target_port,
                                    protocol: "TCP".to_string(),
                                })
                                .collect(),
                        }],
                    },
                },
            },
        });

        if service.ports.is_empty() {
            continue;
        }

        exposures.push(Exposure {
            api_version: "v1".to_string(),
            kind: "Service".to_string(),
            metadata,
            spec: ServiceSpec {
                selector,
                ports: service
                    .ports
                    .iter()
                    .map(|p| ServicePortSpec {
                        name: port_name(p),
                        port: p.target_port,
                        target_port: p.target_port,
                        protocol: "TCP".to_string(),
                    })
                    .collect(),
            },
        });

        for port in &service.ports {
            if let Some(local_port) = port.source_port {
                tunnels.push(TunnelSpec {
                    service: service.id.clone(),
                    local_port,
                    remote_port: port.target_port,
                });
            }
        }
    }

    OrchestratorDocument {
        name,
        namespace,
        workloads,
        exposures,
        tunnels,
    }
}

/// Orchestrator port names: at most 15 lowercase alphanumerics or `-`,
/// starting with a letter
fn port_name(port: &StackPort) -> String {
    let suffix = format!("-{}", port.target_port);
    let budget = 15 - suffix.len();

    let mut prefix: String = port
        .protocol
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(budget)
        .collect();
    if !prefix.starts_with(|c: char| c.is_ascii_alphabetic()) {
        prefix.insert(0, 'p');
        prefix.truncate(budget);
    }
    let prefix = prefix.trim_end_matches('-');

    format!("{}{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Protocol;

    fn shop() -> ResolvedSystem {
        let mut gateway = ResolvedService::new("gateway", "microzoo/go-service")
            .with_port(8080, "http", Some(8080))
            .with_dependency("catalog");
        gateway.upstream_env = Some("MICROZOO_UPSTREAMSERVICES".into());
        gateway.upstreams.push(crate::domain::entities::Upstream {
            service: "catalog".into(),
            host: "catalog".into(),
            port: Some(8081),
            protocol: Protocol::http_rest(),
        });

        let mut catalog = ResolvedService::new("catalog", "microzoo/spring-boot-service")
            .with_port(8081, "http", None)
            .with_port(9090, "grpc", Some(9090));
        catalog.replicas = 2;

        ResolvedSystem::new("Shop")
            .with_service(gateway)
            .with_service(catalog)
            .with_service(ResolvedService::new("worker", "microzoo/worker"))
    }

    fn compose_of(system: &ResolvedSystem) -> ComposeDocument {
        match generate(system, Target::Compose) {
            StackDocument::Compose(doc) => doc,
            other => panic!("expected compose, got {:?}", other.target()),
        }
    }

    fn orchestrator_of(system: &ResolvedSystem) -> OrchestratorDocument {
        match generate(system, Target::Kubernetes) {
            StackDocument::Orchestrator(doc) => doc,
            other => panic!("expected orchestrator, got {:?}", other.target()),
        }
    }

    #[test]
    fn compose_keeps_declaration_order() {
        let doc = compose_of(&shop());
        let ids: Vec<&str> = doc.services.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["gateway", "catalog", "worker"]);
        assert_eq!(doc.name, "shop");
    }

    #[test]
    fn compose_entry_has_ports_env_and_ordering() {
        let doc = compose_of(&shop());
        let gateway = doc.service("gateway").unwrap();

        assert_eq!(gateway.ports, vec!["8080:8080"]);
        assert_eq!(gateway.depends_on, vec!["catalog"]);
        assert_eq!(
            gateway.environment["MICROZOO_UPSTREAMSERVICES"],
            "http://catalog:8081"
        );
        assert!(gateway.deploy.is_none());

        let catalog = doc.service("catalog").unwrap();
        assert_eq!(catalog.ports, vec!["9090:9090"]);
        assert_eq!(catalog.expose, vec!["8081"]);
        assert_eq!(catalog.deploy, Some(ComposeDeploy { replicas: 2 }));
    }

    #[test]
    fn compose_renders_services_in_order() {
        let yaml = generate(&shop(), Target::Compose).render().unwrap();
        let gateway = yaml.find("\n  gateway:\n").unwrap();
        let catalog = yaml.find("\n  catalog:\n").unwrap();
        let worker = yaml.find("\n  worker:\n").unwrap();
        assert!(gateway < catalog && catalog < worker, "{}", yaml);
        assert!(yaml.starts_with("name: shop\n"), "{}", yaml);
    }

    #[test]
    fn orchestrator_has_one_workload_per_service() {
        let doc = orchestrator_of(&shop());
        assert_eq!(doc.workloads.len(), 3);
    }

    #[test]
    fn orchestrator_has_one_exposure_entry_per_declared_port() {
        let system = shop();
        let doc = orchestrator_of(&system);
        let declared: usize = system.services.iter().map(|s| s.ports.len()).sum();

        assert_eq!(doc.exposed_port_count(), declared);
        // worker declares no port and gets no exposure
        assert_eq!(doc.exposures.len(), 2);
    }

    #[test]
    fn orchestrator_tunnels_cover_published_ports() {
        let doc = orchestrator_of(&shop());
        assert_eq!(
            doc.tunnels,
            vec![
                TunnelSpec {
                    service: "gateway".into(),
                    local_port: 8080,
                    remote_port: 8080
                },
                TunnelSpec {
                    service: "catalog".into(),
                    local_port: 9090,
                    remote_port: 9090
                },
            ]
        );
    }

    #[test]
    fn orchestrator_render_is_multi_document() {
        let yaml = generate_with(
            &shop(),
            Target::Kubernetes,
            &GenerateOptions {
                namespace: Some("zoo".into()),
            },
        )
        .render()
        .unwrap();

        assert_eq!(yaml.matches("---\n").count(), 5);
        assert_eq!(yaml.matches("kind: Deployment").count(), 3);
        assert_eq!(yaml.matches("kind: Service").count(), 2);
        assert!(yaml.contains("namespace: zoo"));
        assert!(yaml.contains("containerPort: 8080"));
    }

    #[test]
    fn one_port_number_with_two_protocols_is_exposed_once() {
        let system = ResolvedSystem::new("shop").with_service(
            ResolvedService::new("catalog", "microzoo/go-service")
                .with_port(8080, "http", None)
                .with_port(8080, "grpc", Some(18080)),
        );

        let doc = orchestrator_of(&system);
        let ports = &doc.exposures[0].spec.ports;
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 8080);
        assert_eq!(ports[0].name, "http-rest-8080");
        assert_eq!(doc.workloads[0].spec.template.spec.containers[0].ports.len(), 1);
        assert_eq!(doc.tunnels.len(), 1);
        assert_eq!(doc.tunnels[0].local_port, 18080);

        let compose = compose_of(&system);
        let catalog = compose.service("catalog").unwrap();
        assert_eq!(catalog.ports, vec!["18080:8080"]);
        assert!(catalog.expose.is_empty());
    }

    #[test]
    fn port_names_fit_orchestrator_limits() {
        let long = StackPort {
            source_port: None,
            target_port: 65535,
            protocol: Protocol::new("very long protocol name"),
        };
        let name = port_name(&long);
        assert!(name.len() <= 15, "{}", name);
        assert_eq!(name, "very-long-65535");

        let numeric = StackPort {
            source_port: None,
            target_port: 80,
            protocol: Protocol::new("9p"),
        };
        assert_eq!(port_name(&numeric), "p9p-80");
    }
}
