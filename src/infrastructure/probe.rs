//! Post-deployment reachability probe
//!
//! A port counts as up once a TCP connection succeeds.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{host}:{port} unreachable after {attempts} attempt(s): {last_error}")]
    Unreachable {
        host: String,
        port: u16,
        attempts: u32,
        last_error: String,
    },

    #[error("{host}:{port} probe aborted: {reason}")]
    Aborted {
        host: String,
        port: u16,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    attempts: u32,
    interval: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, attempts: u32, interval: Duration) -> Self {
        Self {
            host: host.into(),
            attempts: attempts.max(1),
            interval,
        }
    }

    pub fn connect_once(&self, port: u16) -> io::Result<()> {
        let mut last = io::Error::new(io::ErrorKind::NotFound, "address did not resolve");
        for addr in (self.host.as_str(), port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(_) => return Ok(()),
                Err(err) => last = err,
            }
        }
        Err(last)
    }

    /// Retry until `port` accepts a connection. `abort` runs before every
    /// attempt; returning a reason ends the probe early.
    ///
    /// Returns the number of attempts used.
    pub fn wait_for(
        &self,
        port: u16,
        mut abort: impl FnMut() -> Option<String>,
    ) -> Result<u32, ProbeError> {
        let mut last_error = String::new();
        for attempt in 1..=self.attempts {
            if let Some(reason) = abort() {
                return Err(ProbeError::Aborted {
                    host: self.host.clone(),
                    port,
                    reason,
                });
            }
            match self.connect_once(port) {
                Ok(()) => {
                    debug!(host = %self.host, port, attempt, "probe succeeded");
                    return Ok(attempt);
                }
                Err(err) => {
                    trace!(host = %self.host, port, attempt, error = %err, "probe attempt failed");
                    last_error = err.to_string();
                }
            }
            if attempt < self.attempts {
                thread::sleep(self.interval);
            }
        }
        Err(ProbeError::Unreachable {
            host: self.host.clone(),
            port,
            attempts: self.attempts,
            last_error,
        })
    }
}
