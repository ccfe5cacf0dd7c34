//! Scenario: the deployment tool is not installed
//!
//! Success Criteria:
//! - The artifact is still written
//! - The error names the missing program

use crate::common::*;

#[test]
fn scenario_missing_compose_tool() {
    let env = TestEnv::with_standard_components();
    env.write_diagram("catalog", CATALOG);

    let result = env.run_with_env(
        &["deploy", "catalog"],
        &[("MICROZOO_COMPOSE_CLI", "microzoo-no-such-tool")],
    );
    assert!(!result.success);
    assert!(result.stderr.contains("microzoo-no-such-tool"), "{}", result.stderr);
    assert!(env.path(".microzoo/stacks/catalog.compose.yaml").exists());
}
