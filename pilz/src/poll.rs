//! Continuous log pull.
//!
//! Every iteration sends one poll byte and waits a bounded time for one
//! datagram. The controller does not answer every poll, so a missing reply
//! is the steady state and never ends the loop.

use std::fmt;
use std::future::Future;
use std::io::{self, ErrorKind, Write};
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, trace, warn};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

use crate::command::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub recv_timeout: Duration,
    pub interval: Duration,
    pub max_datagram: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            recv_timeout: Duration::from_millis(500),
            interval: Duration::from_millis(500),
            max_datagram: 2048,
        }
    }
}

/// Result of one poll exchange.
#[derive(Debug)]
pub enum Outcome {
    /// Log text to print as-is.
    Chunk(String),
    /// Nothing came back in time.
    Timeout,
    /// A datagram of this many bytes arrived but was not UTF-8.
    Undecodable(usize),
    /// Socket error the loop expects to see now and then.
    Transient(io::Error),
    /// Socket error that points at a real problem on this host.
    Fault(io::Error),
}

/// Sorts a socket error into the expected and the unexpected.
pub fn classify(err: io::Error) -> Outcome {
    match err.kind() {
        ErrorKind::TimedOut => Outcome::Timeout,
        ErrorKind::WouldBlock
        | ErrorKind::Interrupted
        | ErrorKind::ConnectionRefused
        | ErrorKind::ConnectionReset => Outcome::Transient(err),
        _ => Outcome::Fault(err),
    }
}

/// Counters for one run of the poll loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollStats {
    pub polls: u64,
    pub chunks: u64,
    pub timeouts: u64,
    pub dropped: u64,
    pub faults: u64,
}

impl fmt::Display for PollStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} polls, {} chunks, {} timeouts, {} dropped, {} faults",
            self.polls, self.chunks, self.timeouts, self.dropped, self.faults
        )
    }
}

/// Sends one poll byte to `addr` and waits for a single reply.
pub async fn poll_once(socket: &UdpSocket, addr: SocketAddr, cfg: &PollConfig) -> Outcome {
    if let Err(err) = socket.send_to(&[Command::Log.byte()], addr).await {
        return classify(err);
    }

    let mut buff = vec![0u8; cfg.max_datagram];
    match timeout(cfg.recv_timeout, socket.recv_from(&mut buff)).await {
        Err(_) => Outcome::Timeout,
        Ok(Err(err)) => classify(err),
        Ok(Ok((n, from))) => {
            trace!("{n} bytes from {from}");
            buff.truncate(n);
            match String::from_utf8(buff) {
                Ok(text) => Outcome::Chunk(text),
                Err(_) => Outcome::Undecodable(n),
            }
        }
    }
}

/// Polls `addr` until `shutdown` resolves.
///
/// Log chunks go to `out` without an added newline; the controller sends its
/// own line breaks. Only a failure to write `out` ends the loop early.
pub async fn run<W, F>(
    socket: &UdpSocket,
    addr: SocketAddr,
    cfg: &PollConfig,
    out: &mut W,
    shutdown: F,
) -> Result<PollStats>
where
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut stats = PollStats::default();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            step = iteration(socket, addr, cfg, out, &mut stats) => step?,
        }
    }

    Ok(stats)
}

async fn iteration<W: Write>(
    socket: &UdpSocket,
    addr: SocketAddr,
    cfg: &PollConfig,
    out: &mut W,
    stats: &mut PollStats,
) -> Result<()> {
    stats.polls += 1;
    match poll_once(socket, addr, cfg).await {
        Outcome::Chunk(text) => {
            stats.chunks += 1;
            out.write_all(text.as_bytes())
                .and_then(|_| out.flush())
                .context("failed to write log output")?;
        }
        Outcome::Timeout => stats.timeouts += 1,
        Outcome::Undecodable(n) => {
            stats.dropped += 1;
            debug!("dropped {n} byte datagram that is not valid UTF-8");
        }
        Outcome::Transient(err) => {
            stats.dropped += 1;
            debug!("transient socket error: {err}");
        }
        Outcome::Fault(err) => {
            stats.faults += 1;
            warn!("poll to {addr} failed: {err}");
        }
    }

    sleep(cfg.interval).await;
    Ok(())
}
