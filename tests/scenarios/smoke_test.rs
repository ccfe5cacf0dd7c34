//! Scenario: smoke-testing a deployed stack
//!
//! Journey: `microzoo test` deploys the stack and probes every published
//! port on the configured host.
//!
//! Success Criteria:
//! - A listening port passes
//! - A closed port fails the command after the configured attempts

use std::net::TcpListener;

use crate::common::*;

fn probe_vars(docker: &str) -> Vec<(&str, &str)> {
    vec![
        ("MICROZOO_COMPOSE_CLI", docker),
        ("MICROZOO_PROBE_ATTEMPTS", "2"),
        ("MICROZOO_PROBE_INTERVAL_MS", "10"),
    ]
}

/// SCENARIO: the published port answers
#[test]
fn scenario_probe_passes_for_listening_port() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let env = TestEnv::with_standard_components();
    env.write_diagram("probe", &published_service(port));
    let docker = env.fake_tool("docker", &env.path("docker.log"), 0);

    let result = env.run_with_env(
        &["test", "probe", "--json"],
        &probe_vars(docker.to_str().unwrap()),
    );
    assert!(result.success, "test failed: {}\n{}", result.stdout, result.stderr);

    let check = result.event("check").expect("check event");
    assert_eq!(check["passed"], 1);
    assert_eq!(check["total"], 1);
    assert_eq!(check["results"][0]["port"], port);
    drop(listener);
}

/// SCENARIO: nothing listens on the published port
#[test]
fn scenario_probe_fails_for_closed_port() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let env = TestEnv::with_standard_components();
    env.write_diagram("probe", &published_service(port));
    let docker = env.fake_tool("docker", &env.path("docker.log"), 0);

    let result = env.run_with_env(&["test", "probe"], &probe_vars(docker.to_str().unwrap()));
    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.contains("0/1 probes passed"), "{}", result.stdout);
    assert!(result.stderr.contains("check failed"), "{}", result.stderr);
}
