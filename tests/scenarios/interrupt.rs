//! Scenario: interrupting a smoke test on the orchestrator target
//!
//! Journey: `microzoo test --target kubernetes` opens port-forwards, then
//! the user presses Ctrl-C while the probes are still retrying.
//!
//! Success Criteria:
//! - microzoo exits promptly instead of finishing its retries
//! - No port-forward process outlives microzoo

use std::net::TcpListener;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::common::*;

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    done()
}

/// Running and not a zombie
fn alive(pid: i32) -> bool {
    // SAFETY: signal 0 only checks that the process exists
    if unsafe { libc::kill(pid, 0) } != 0 {
        return false;
    }
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => !stat.contains(") Z"),
        Err(_) => !Path::new("/proc/self").exists(),
    }
}

/// SCENARIO: Ctrl-C during the probe loop stops every tunnel
#[test]
fn scenario_interrupt_kills_port_forwards() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let env = TestEnv::with_standard_components();
    env.write_diagram("probe", &published_service(port));
    let pids = env.path("forward.pids");
    let kubectl = env.script_tool(
        "kubectl",
        &format!(
            "case \"$*\" in\n  *port-forward*)\n    echo $$ >> '{}'\n    echo \"Forwarding from 127.0.0.1:{port} -> 8080\"\n    exec sleep 60\n    ;;\nesac\nexit 0\n",
            pids.display()
        ),
    );

    let mut child = env.spawn_with_env(
        &["test", "probe", "--target", "kubernetes"],
        &[
            ("MICROZOO_ORCHESTRATOR_CLI", kubectl.to_str().unwrap()),
            ("MICROZOO_PROBE_ATTEMPTS", "200"),
            ("MICROZOO_PROBE_INTERVAL_MS", "100"),
        ],
    );

    assert!(
        wait_until(Duration::from_secs(10), || pids.exists()),
        "port-forward never started"
    );
    thread::sleep(Duration::from_millis(300));
    let forward: i32 = std::fs::read_to_string(&pids)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    let started = Instant::now();
    // SAFETY: plain signal delivery to our own child
    unsafe { libc::kill(child.id() as i32, libc::SIGINT) };

    let exited = wait_until(Duration::from_secs(10), || {
        matches!(child.try_wait(), Ok(Some(_)))
    });
    if !exited {
        let _ = child.kill();
    }
    assert!(exited, "microzoo ignored the interrupt");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(
        wait_until(Duration::from_secs(2), || !alive(forward)),
        "port-forward {forward} survived the interrupt"
    );
}
