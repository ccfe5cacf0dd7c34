//! Process Runner Port
//!
//! Abstracts launching external tools (`docker`, `kubectl`). Deployers and
//! the tunnel supervisor only see this trait, so tests can swap in a fake
//! runner that records commands instead of executing them.

use std::fmt;

use thiserror::Error;

/// A command line to execute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How the child's standard streams are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Child writes straight to our terminal
    Inherit,
    /// Streams are piped, collected and forwarded line by line
    Capture,
}

/// Which stream a captured line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Receives each captured line as it arrives.
///
/// Runs on a reader thread, not on the caller's thread.
pub type LineHandler = Box<dyn FnMut(StreamKind, &str) + Send>;

/// Everything a finished process produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A process that ran but did not exit with status zero
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("process exited with {}", exit_label(.exit_code))]
pub struct ProcessFailure {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ProcessFailure {
    /// Last `lines` lines of stderr
    pub fn stderr_tail(&self, lines: usize) -> String {
        tail(&self.stderr, lines)
    }
}

impl From<ProcessOutput> for ProcessFailure {
    fn from(output: ProcessOutput) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code,
        }
    }
}

/// Human label for an exit code
pub fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

/// Last `lines` lines of `text`, joined with `\n`
pub fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// The tool could not be started at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("tool missing: '{program}' was not found (is it installed and on PATH?)")]
    NotFound { program: String },

    #[error("tool launch failed: permission denied running '{program}'")]
    PermissionDenied { program: String },

    #[error("tool launch failed: '{program}': {message}")]
    Other { program: String, message: String },
}

impl LaunchError {
    /// Classify a spawn error
    pub fn from_io(program: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                program: program.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                program: program.to_string(),
            },
            _ => Self::Other {
                program: program.to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// A running child process
pub trait ProcessHandle: Send {
    /// OS process id (also the process-group id)
    fn pid(&self) -> u32;

    /// Non-blocking exit check
    fn has_exited(&mut self) -> bool;

    /// Block until the process exits and its streams are drained
    fn wait(self: Box<Self>) -> Result<ProcessOutput, ProcessFailure>;

    /// Terminate the process and everything it spawned
    fn kill_tree(&mut self) -> std::io::Result<()>;
}

/// Launches external tools
pub trait ProcessRunner: Send + Sync {
    /// Start `spec`. `handler`, when given, sees every captured line.
    fn spawn(
        &self,
        spec: &CommandSpec,
        mode: StdioMode,
        handler: Option<LineHandler>,
    ) -> Result<Box<dyn ProcessHandle>, LaunchError>;
}
