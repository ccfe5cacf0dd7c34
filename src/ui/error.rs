use std::io::{self, Write};

use is_terminal::IsTerminal;
use microzoo::MicrozooError;

const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Machine-readable kind; `error` for anything outside the library
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<MicrozooError>()
        .map(MicrozooError::kind)
        .unwrap_or("error")
}

pub fn format_error(err: &anyhow::Error, color: bool) -> String {
    let message = match err.downcast_ref::<MicrozooError>() {
        Some(known) => known.to_string(),
        None => format!("{:#}", err),
    };
    let hint = hint_for(err);

    let mut out = if color {
        format!("{RED}{BOLD}error:{RESET} {message}\n")
    } else {
        format!("error: {message}\n")
    };
    if let Some(hint) = hint {
        out.push_str(&format!("  hint: {hint}\n"));
    }
    out
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<MicrozooError>()? {
        MicrozooError::DiagramNotFound { .. } => {
            Some("pass a file path, or set --source-dir to the directory holding the diagram")
        }
        MicrozooError::Manifest(_) | MicrozooError::Unresolved(_) => {
            Some("check --components points at <category>/<name>/manifest.toml descriptors")
        }
        _ => None,
    }
}

pub fn error_event(err: &anyhow::Error) -> serde_json::Value {
    serde_json::json!({
        "event": "error",
        "kind": error_kind(err),
        "message": err.downcast_ref::<MicrozooError>()
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("{:#}", err)),
    })
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let _ = crate::ui::json::emit(error_event(err));
        return;
    }
    let stderr = io::stderr();
    let color = stderr.is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let _ = stderr.lock().write_all(format_error(err, color).as_bytes());
}
