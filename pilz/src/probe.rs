//! One-shot exchange for poking at the controller by hand.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use log::debug;
use tokio::time::timeout;

use crate::target::{bind_for, Target};

pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);
pub const PROBE_MAX_DATAGRAM: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The target could not be resolved or a socket could not be bound.
    #[error("setup: {0:#}")]
    Setup(anyhow::Error),

    #[error("send: {0}")]
    Send(#[source] io::Error),

    #[error("receive: {0}")]
    Recv(#[source] io::Error),

    /// Nothing came back within the timeout.
    #[error("no response within {0:?}")]
    NoResponse(Duration),
}

/// Sends `payload` once and returns the first datagram that comes back.
///
/// The socket lives only for the duration of the call.
pub async fn probe(target: &Target, payload: &[u8], wait: Duration) -> Result<Bytes, ProbeError> {
    let addr = target.resolve().await.map_err(ProbeError::Setup)?;
    let socket = bind_for(addr).await.map_err(ProbeError::Setup)?;

    socket
        .send_to(payload, addr)
        .await
        .map_err(ProbeError::Send)?;
    debug!("sent {} bytes to {addr}", payload.len());

    let mut buff = [0u8; PROBE_MAX_DATAGRAM];
    let (n, from) = timeout(wait, socket.recv_from(&mut buff))
        .await
        .map_err(|_| ProbeError::NoResponse(wait))?
        .map_err(ProbeError::Recv)?;
    debug!("received {n} bytes from {from}");

    Ok(Bytes::copy_from_slice(&buff[..n]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tokio::net::UdpSocket;

    #[test]
    fn socket_errors_keep_their_source() {
        let err = ProbeError::Send(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.to_string().starts_with("send: "));
        assert!(err.source().is_some());

        let err = ProbeError::Recv(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(err.to_string().starts_with("receive: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn setup_error_shows_full_context_chain() {
        let cause = anyhow::anyhow!("lookup failed").context("failed to resolve pilz:1234");
        let err = ProbeError::Setup(cause);
        assert_eq!(
            err.to_string(),
            "setup: failed to resolve pilz:1234: lookup failed"
        );
        assert!(err.source().is_none());
    }

    #[tokio::test]
    async fn returns_raw_reply() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();

        let echo = tokio::spawn(async move {
            let mut buff = [0u8; 64];
            let (n, from) = device.recv_from(&mut buff).await.unwrap();
            device.send_to(&buff[..n], from).await.unwrap();
        });

        let target = Target::new("127.0.0.1").with_port(port);
        let reply = probe(&target, b"hello", PROBE_TIMEOUT).await.unwrap();
        assert_eq!(reply, Bytes::from_static(b"hello"));
        echo.await.unwrap();
    }

    #[tokio::test]
    async fn silent_device_is_no_response() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();

        let target = Target::new("127.0.0.1").with_port(port);
        let err = probe(&target, b"?", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::NoResponse(_)));
        assert_eq!(err.to_string(), "no response within 100ms");
    }
}
