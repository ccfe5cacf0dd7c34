//! Scenario: compose stack lifecycle
//!
//! Journey: compile and deploy a diagram, ask for status, then drop it.
//!
//! Success Criteria:
//! - Each command drives the compose tool against the stored artifact
//! - A failing tool surfaces as a deployment error with exit code 1

use crate::common::*;

/// SCENARIO: deploy, status and drop share one artifact
#[test]
fn scenario_deploy_status_drop() {
    let env = TestEnv::with_standard_components();
    env.write_diagram("catalog", CATALOG);
    let log = env.path("docker.log");
    let docker = env.fake_tool("docker", &log, 0);
    let docker = docker.to_str().unwrap();
    let vars = [("MICROZOO_COMPOSE_CLI", docker)];

    let result = env.run_with_env(&["deploy", "catalog"], &vars);
    assert!(result.success, "deploy failed: {}", result.stderr);
    assert!(result.stdout.contains("deployed catalog"), "{}", result.stdout);

    let result = env.run_with_env(&["status", "catalog"], &vars);
    assert!(result.success, "status failed: {}", result.stderr);
    assert!(result.stdout.contains("fake docker compose"), "{}", result.stdout);

    let result = env.run_with_env(&["drop", "catalog"], &vars);
    assert!(result.success, "drop failed: {}", result.stderr);
    assert!(result.stdout.contains("dropped catalog"), "{}", result.stdout);

    let calls = std::fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 3, "{calls:?}");
    assert!(calls[0].starts_with("compose -p catalog -f "), "{}", calls[0]);
    assert!(calls[0].ends_with("catalog.compose.yaml up -d"), "{}", calls[0]);
    assert!(calls[1].ends_with(" ps"), "{}", calls[1]);
    assert!(calls[2].ends_with(" down --remove-orphans"), "{}", calls[2]);
}

/// SCENARIO: the compose tool rejects the stack
#[test]
fn scenario_tool_failure_is_reported() {
    let env = TestEnv::with_standard_components();
    env.write_diagram("catalog", CATALOG);
    let log = env.path("docker.log");
    let docker = env.fake_tool("docker", &log, 3);

    let result = env.run_with_env(
        &["deploy", "catalog", "--json"],
        &[("MICROZOO_COMPOSE_CLI", docker.to_str().unwrap())],
    );
    assert_eq!(result.exit_code, 1);

    let event = result.event("error").expect("error event");
    assert_eq!(event["kind"], "deployment");
    assert!(
        event["message"].as_str().unwrap().contains("exited with"),
        "{}",
        event["message"]
    );
}
