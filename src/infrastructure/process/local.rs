//! Local process runner
//!
//! Spawns tools with `std::process`. In capture mode one reader thread per
//! pipe forwards lines over a channel to a collector thread, which feeds the
//! line handler and keeps the full text for `wait`.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::domain::ports::{
    CommandSpec, LaunchError, LineHandler, ProcessFailure, ProcessHandle, ProcessOutput,
    ProcessRunner, StdioMode, StreamKind,
};

/// Time a process group gets to exit after SIGTERM
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// Runs tools on this machine
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

impl LocalRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for LocalRunner {
    fn spawn(
        &self,
        spec: &CommandSpec,
        mode: StdioMode,
        handler: Option<LineHandler>,
    ) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).stdin(Stdio::null());
        match mode {
            StdioMode::Inherit => cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
            StdioMode::Capture => cmd.stdout(Stdio::piped()).stderr(Stdio::piped()),
        };
        own_process_group(&mut cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| LaunchError::from_io(&spec.program, &e))?;
        debug!(pid = child.id(), command = %spec, "spawned");

        let collector = match mode {
            StdioMode::Capture => Some(collect(&mut child, handler)),
            StdioMode::Inherit => None,
        };

        Ok(Box::new(LocalHandle {
            pid: child.id(),
            child,
            collector,
        }))
    }
}

#[cfg(unix)]
fn own_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn own_process_group(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn own_process_group(_cmd: &mut Command) {}

fn collect(child: &mut Child, mut handler: Option<LineHandler>) -> JoinHandle<(String, String)> {
    let (tx, rx) = mpsc::channel::<(StreamKind, String)>();

    if let Some(stdout) = child.stdout.take() {
        spawn_reader(stdout, StreamKind::Stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(stderr, StreamKind::Stderr, tx.clone());
    }
    drop(tx);

    thread::spawn(move || {
        let mut stdout = String::new();
        let mut stderr = String::new();
        // Ends once both readers hit EOF and drop their senders
        for (kind, line) in rx {
            trace!(?kind, line = %line, "process output");
            if let Some(handler) = handler.as_mut() {
                handler(kind, &line);
            }
            let buffer = match kind {
                StreamKind::Stdout => &mut stdout,
                StreamKind::Stderr => &mut stderr,
            };
            buffer.push_str(&line);
            buffer.push('\n');
        }
        (stdout, stderr)
    })
}

fn spawn_reader<R>(pipe: R, kind: StreamKind, tx: mpsc::Sender<(StreamKind, String)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        for line in BufReader::new(pipe).lines() {
            let Ok(line) = line else { break };
            if tx.send((kind, line)).is_err() {
                break;
            }
        }
    });
}

struct LocalHandle {
    pid: u32,
    child: Child,
    collector: Option<JoinHandle<(String, String)>>,
}

impl ProcessHandle for LocalHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn has_exited(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }

    fn wait(mut self: Box<Self>) -> Result<ProcessOutput, ProcessFailure> {
        let status = self.child.wait();
        let (stdout, stderr) = self
            .collector
            .take()
            .map(|c| c.join().unwrap_or_default())
            .unwrap_or_default();

        let output = match status {
            Ok(status) => ProcessOutput {
                stdout,
                stderr,
                exit_code: status.code(),
            },
            Err(e) => ProcessOutput {
                stdout,
                stderr: format!("{}{}\n", stderr, e),
                exit_code: None,
            },
        };
        debug!(pid = self.pid, exit_code = ?output.exit_code, "process finished");

        if output.success() {
            Ok(output)
        } else {
            Err(output.into())
        }
    }

    fn kill_tree(&mut self) -> std::io::Result<()> {
        debug!(pid = self.pid, "killing process tree");
        kill_group(self)
    }
}

#[cfg(unix)]
fn kill_group(handle: &mut LocalHandle) -> std::io::Result<()> {
    let Ok(pgid) = libc::pid_t::try_from(handle.pid) else {
        return handle.child.kill();
    };

    // The group outlives its leader while any member is still running
    if !signal_group(pgid, libc::SIGTERM)? {
        return Ok(());
    }
    let deadline = Instant::now() + TERMINATE_GRACE;
    while Instant::now() < deadline {
        // Reap the leader so a zombie does not keep the group alive
        handle.has_exited();
        if !signal_group(pgid, 0)? {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(20));
    }
    signal_group(pgid, libc::SIGKILL).map(|_| ())
}

/// `Ok(false)` once no process is left in the group
#[cfg(unix)]
fn signal_group(pgid: libc::pid_t, signal: libc::c_int) -> std::io::Result<bool> {
    // SAFETY: killpg has no memory-safety preconditions
    let rc = unsafe { libc::killpg(pgid, signal) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(windows)]
fn kill_group(handle: &mut LocalHandle) -> std::io::Result<()> {
    let status = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &handle.pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() || handle.has_exited() {
        Ok(())
    } else {
        handle.child.kill()
    }
}

#[cfg(not(any(unix, windows)))]
fn kill_group(handle: &mut LocalHandle) -> std::io::Result<()> {
    handle.child.kill()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn capture_collects_both_streams() {
        let handle = LocalRunner
            .spawn(&sh("echo out; echo err 1>&2"), StdioMode::Capture, None)
            .unwrap();
        let output = handle.wait().unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code, Some(0));
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let handle = LocalRunner
            .spawn(&sh("echo nope 1>&2; exit 3"), StdioMode::Capture, None)
            .unwrap();
        let failure = handle.wait().unwrap_err();

        assert_eq!(failure.exit_code, Some(3));
        assert_eq!(failure.stderr_tail(20), "nope");
    }

    #[test]
    fn handler_sees_tagged_lines() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: LineHandler = Box::new(move |kind: StreamKind, line: &str| {
            sink.lock().unwrap().push((kind, line.to_string()));
        });

        let handle = LocalRunner
            .spawn(&sh("echo a; echo b 1>&2"), StdioMode::Capture, Some(handler))
            .unwrap();
        handle.wait().unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&(StreamKind::Stdout, "a".to_string())));
        assert!(seen.contains(&(StreamKind::Stderr, "b".to_string())));
    }

    #[test]
    fn missing_program_is_launch_error() {
        let err = LocalRunner
            .spawn(
                &CommandSpec::new("microzoo-definitely-not-installed"),
                StdioMode::Capture,
                None,
            )
            .err()
            .unwrap();
        assert!(matches!(err, LaunchError::NotFound { .. }));
    }

    #[test]
    fn kill_tree_stops_children() {
        let mut handle = LocalRunner
            .spawn(&sh("sleep 30 & sleep 30; wait"), StdioMode::Capture, None)
            .unwrap();
        handle.kill_tree().unwrap();

        let started = Instant::now();
        let failure = handle.wait().unwrap_err();
        assert_eq!(failure.exit_code, None);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    fn running(pid: libc::pid_t) -> bool {
        // SAFETY: signal 0 only checks that the process exists
        if unsafe { libc::kill(pid, 0) } != 0 {
            return false;
        }
        // Killed orphans may linger as zombies until init reaps them
        std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .map(|stat| !stat.contains(") Z"))
            .unwrap_or(true)
    }

    #[test]
    fn kill_tree_reaches_children_of_exited_leader() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("child.pid");
        let script = format!(
            "sleep 60 >/dev/null 2>&1 & echo $! > '{}'; exit 1",
            pid_file.display()
        );
        let mut handle = LocalRunner
            .spawn(&sh(&script), StdioMode::Capture, None)
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.has_exited() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(handle.has_exited());
        let child: libc::pid_t = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(running(child));

        handle.kill_tree().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while running(child) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!running(child), "background child {child} survived kill_tree");
    }

    #[test]
    fn kill_tree_after_group_is_gone_is_ok() {
        let mut handle = LocalRunner
            .spawn(&sh("exit 0"), StdioMode::Capture, None)
            .unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.has_exited() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        handle.kill_tree().unwrap();
        assert!(handle.wait().is_ok());
    }
}
