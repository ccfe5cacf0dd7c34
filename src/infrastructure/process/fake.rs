//! Scripted process runner for tests
//!
//! Records every spawned command and every `kill_tree` call. Scripts decide
//! what a matching command prints and how it exits.

use std::sync::{Arc, Mutex};

use crate::domain::ports::{
    CommandSpec, LaunchError, LineHandler, ProcessFailure, ProcessHandle, ProcessOutput,
    ProcessRunner, StdioMode, StreamKind,
};

/// What a matching command does
#[derive(Debug, Clone)]
pub struct Script {
    /// Substring of the rendered command line
    pub matcher: String,
    pub lines: Vec<(StreamKind, String)>,
    /// `None` keeps the process running until killed
    pub exit_code: Option<i32>,
    pub launch_error: Option<LaunchError>,
}

impl Script {
    pub fn exits(matcher: &str, code: i32) -> Self {
        Self {
            matcher: matcher.to_string(),
            lines: Vec::new(),
            exit_code: Some(code),
            launch_error: None,
        }
    }

    pub fn runs(matcher: &str) -> Self {
        Self {
            exit_code: None,
            ..Self::exits(matcher, 0)
        }
    }

    pub fn unavailable(matcher: &str, error: LaunchError) -> Self {
        Self {
            launch_error: Some(error),
            ..Self::exits(matcher, 0)
        }
    }

    pub fn stdout(mut self, line: &str) -> Self {
        self.lines.push((StreamKind::Stdout, line.to_string()));
        self
    }

    pub fn stderr(mut self, line: &str) -> Self {
        self.lines.push((StreamKind::Stderr, line.to_string()));
        self
    }
}

#[derive(Default)]
struct State {
    scripts: Vec<Script>,
    spawned: Vec<(u32, CommandSpec)>,
    killed: Vec<u32>,
    next_pid: u32,
}

/// Runner that never starts a real process
#[derive(Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<State>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later scripts take precedence over earlier ones
    pub fn script(&self, script: Script) -> &Self {
        self.lock().scripts.push(script);
        self
    }

    /// Rendered command lines, in spawn order
    pub fn commands(&self) -> Vec<String> {
        self.lock()
            .spawned
            .iter()
            .map(|(_, spec)| spec.to_string())
            .collect()
    }

    pub fn pid_of(&self, matcher: &str) -> Vec<u32> {
        self.lock()
            .spawned
            .iter()
            .filter(|(_, spec)| spec.to_string().contains(matcher))
            .map(|(pid, _)| *pid)
            .collect()
    }

    pub fn killed(&self) -> Vec<u32> {
        self.lock().killed.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProcessRunner for FakeRunner {
    fn spawn(
        &self,
        spec: &CommandSpec,
        _mode: StdioMode,
        handler: Option<LineHandler>,
    ) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        let rendered = spec.to_string();
        let script = {
            let state = self.lock();
            state
                .scripts
                .iter()
                .rev()
                .find(|s| rendered.contains(&s.matcher))
                .cloned()
                .unwrap_or_else(|| Script::exits("", 0))
        };
        if let Some(error) = script.launch_error {
            return Err(error);
        }

        let pid = {
            let mut state = self.lock();
            state.next_pid += 1;
            let pid = 1000 + state.next_pid;
            state.spawned.push((pid, spec.clone()));
            pid
        };

        let mut output = ProcessOutput {
            exit_code: script.exit_code,
            ..Default::default()
        };
        let mut handler = handler;
        for (kind, line) in &script.lines {
            if let Some(handler) = handler.as_mut() {
                handler(*kind, line);
            }
            let buffer = match kind {
                StreamKind::Stdout => &mut output.stdout,
                StreamKind::Stderr => &mut output.stderr,
            };
            buffer.push_str(line);
            buffer.push('\n');
        }

        Ok(Box::new(FakeHandle {
            pid,
            output,
            killed: false,
            runner: self.clone(),
        }))
    }
}

struct FakeHandle {
    pid: u32,
    output: ProcessOutput,
    killed: bool,
    runner: FakeRunner,
}

impl ProcessHandle for FakeHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn has_exited(&mut self) -> bool {
        self.killed || self.output.exit_code.is_some()
    }

    fn wait(self: Box<Self>) -> Result<ProcessOutput, ProcessFailure> {
        if self.output.success() && !self.killed {
            Ok(self.output)
        } else {
            Err(self.output.into())
        }
    }

    fn kill_tree(&mut self) -> std::io::Result<()> {
        self.killed = true;
        self.runner.lock().killed.push(self.pid);
        Ok(())
    }
}
