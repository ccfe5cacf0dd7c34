//! Shared manifests and diagrams.

pub const GO_SERVICE: &str = r#"
image = "microzoo/go-service:latest"
upstream_env = "MICROZOO_UPSTREAMSERVICES"

[[ports]]
port = 8080
protocol = "http-rest"

[properties]
payloadSize = "MICROZOO_PAYLOADSIZE"
"#;

pub const POSTGRES: &str = r#"
image = "postgres:16"
required_env = ["POSTGRES_PASSWORD"]

[environment]
POSTGRES_DB = "{id}"
POSTGRES_PASSWORD = "microzoo"

[[ports]]
port = 5432
protocol = "jdbc"

[bindings.jdbc]
MICROZOO_DB_HOST = "{host}"
MICROZOO_DB_PORT = "{port}"
MICROZOO_DB_NAME = "{id}"
"#;

/// Service with a published port in front of its database
pub const CATALOG: &str = "@startuml
component Catalog <<service>> {
  publish = 8080
  payloadSize = 200
}
database CatalogDb
Catalog --> CatalogDb : jdbc
@enduml
";

/// Two services in a dependency cycle
pub const CYCLE: &str = "@startuml
component A <<service>>
component B <<service>>
A --> B
B --> A
@enduml
";

/// Standalone service published on `port`
pub fn published_service(port: u16) -> String {
    format!("@startuml\ncomponent Probe <<service>> {{\n  publish = {port}\n}}\n@enduml\n")
}
