use std::io::{self, Write};

use is_terminal::IsTerminal;
use microzoo::application::{CheckResult, CompileResult};
use microzoo::config::ConfigWarning;
use microzoo::domain::entities::TunnelSpec;
use microzoo::domain::ports::{DeployReport, StackArtifact, StatusReport, TunnelSession};
use serde_json::json;

use super::json::emit;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

fn color_stdout() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, code: &str) -> String {
    if color_stdout() {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}

fn line(text: String) {
    let _ = writeln!(io::stdout().lock(), "{}", text);
}

pub fn print_config_warnings(warnings: &[ConfigWarning], json: bool) {
    for w in warnings {
        if json {
            let _ = emit(json!({
                "event": "warning",
                "kind": "config",
                "key": w.key,
                "file": w.file.display().to_string(),
                "line": w.line,
                "suggestion": w.suggestion,
            }));
        } else {
            eprintln!("warning: {}", w);
        }
    }
}

pub fn print_compiled(result: &CompileResult, json: bool) {
    let artifact = &result.artifact;
    if json {
        let _ = emit(json!({
            "event": "compiled",
            "diagram": result.diagram.display().to_string(),
            "target": artifact.target.identifier(),
            "artifact": artifact.path.display().to_string(),
            "services": artifact.workloads,
        }));
        return;
    }
    line(format!(
        "{} {} ({} service{}, {}) -> {}",
        paint("compiled", GREEN),
        result.diagram.display(),
        artifact.workloads.len(),
        if artifact.workloads.len() == 1 { "" } else { "s" },
        artifact.target.identifier(),
        artifact.path.display()
    ));
}

pub fn print_deployed(report: &DeployReport, json: bool) {
    if json {
        let _ = emit(json!({
            "event": "deployed",
            "target": report.target.identifier(),
            "project": report.project,
            "workloads": report.workloads,
        }));
    } else {
        line(format!(
            "{} {} on {}: {}",
            paint("deployed", GREEN),
            report.project,
            report.target.display_name(),
            report.workloads.join(", ")
        ));
    }
    if let Some(tunnels) = &report.tunnels {
        print_tunnels(tunnels.as_ref(), json);
    }
}

pub fn print_tunnels(tunnels: &dyn TunnelSession, json: bool) {
    let states = tunnels.states();
    if json {
        let entries: Vec<serde_json::Value> = states
            .iter()
            .map(|(spec, state)| {
                json!({
                    "service": spec.service.as_str(),
                    "local_port": spec.local_port,
                    "remote_port": spec.remote_port,
                    "state": state.to_string(),
                })
            })
            .collect();
        let _ = emit(json!({"event": "tunnels", "tunnels": entries}));
        return;
    }
    for (spec, state) in states {
        line(format!(
            "  tunnel localhost:{} -> {}:{} [{}]",
            spec.local_port, spec.service, spec.remote_port, state
        ));
    }
}

pub fn print_tunnel_failed(tunnel: &TunnelSpec, reason: &str, restarting: bool, json: bool) {
    if json {
        let _ = emit(json!({
            "event": "tunnel_failed",
            "service": tunnel.service.as_str(),
            "local_port": tunnel.local_port,
            "reason": reason,
            "restarting": restarting,
        }));
        return;
    }
    eprintln!(
        "{} {}: {}{}",
        paint("tunnel failed", YELLOW),
        tunnel,
        reason,
        if restarting { " (restarting all tunnels)" } else { "" }
    );
}

pub fn print_waiting(json: bool) {
    if !json {
        line("tunnels open; press Ctrl-C to stop".to_string());
    }
}

pub fn print_stopped(json: bool) {
    if json {
        let _ = emit(json!({"event": "stopped"}));
    } else {
        line("tunnels stopped".to_string());
    }
}

pub fn print_status(report: &StatusReport, json: bool) {
    if json {
        let _ = emit(json!({
            "event": "status",
            "target": report.target.identifier(),
            "project": report.project,
            "output": report.output,
        }));
        return;
    }
    line(format!("{} ({})", report.project, report.target.display_name()));
    let _ = io::stdout().lock().write_all(report.output.as_bytes());
}

pub fn print_dropped(artifact: &StackArtifact, json: bool) {
    if json {
        let _ = emit(json!({
            "event": "dropped",
            "target": artifact.target.identifier(),
            "project": artifact.project,
            "artifact": artifact.path.display().to_string(),
        }));
        return;
    }
    line(format!(
        "{} {} ({})",
        paint("dropped", GREEN),
        artifact.project,
        artifact.target.display_name()
    ));
}

pub fn print_check(result: &CheckResult, json: bool) {
    if json {
        let items: Vec<serde_json::Value> = result
            .items
            .iter()
            .map(|item| match &item.outcome {
                Ok(attempts) => json!({
                    "service": item.service.as_str(),
                    "port": item.port,
                    "ok": true,
                    "attempts": attempts,
                }),
                Err(err) => json!({
                    "service": item.service.as_str(),
                    "port": item.port,
                    "ok": false,
                    "error": err.to_string(),
                }),
            })
            .collect();
        let _ = emit(json!({
            "event": "check",
            "passed": result.passed(),
            "total": result.items.len(),
            "results": items,
        }));
        return;
    }

    for item in &result.items {
        match &item.outcome {
            Ok(_) => line(format!("{} {}:{}", paint("ok", GREEN), item.service, item.port)),
            Err(err) => line(format!("{} {}: {}", paint("fail", RED), item.service, err)),
        }
    }
    line(format!("{}/{} probes passed", result.passed(), result.items.len()));
}
