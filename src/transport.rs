//! Transport session (C2).
//!
//! A `Transport` is one logical connection to one server endpoint: send a
//! request, await exactly one matching reply. The engine in [`crate::leader_rpc`]
//! serializes requests onto a session itself, so a `Transport` impl need not
//! be internally concurrent.
//!
//! The framed byte-stream delivery §4.2 assumes is "given by the
//! environment" is realized here, at the bottom of this crate, by a minimal
//! length-prefixed record layer over `tokio::net::TcpStream`: each message is
//! a 4-byte big-endian length followed by that many bytes. This is not part
//! of the versioned wire protocol in §6 — it only exists so a `Transport` has
//! something concrete to drive over a real socket.

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Errors a [`Transport`] can report. Both are retried by the engine, never
/// surfaced to a `LeaderRpc::call` caller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed { addr: SocketAddr, source: io::Error },

    /// The peer closed the connection before a reply arrived — "accepted the
    /// connection but hung up without replying."
    #[error("connection closed before a reply arrived")]
    Closed,

    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One connection to one server. `send` is `&mut self`: a `Transport` handles
/// at most one outstanding request at a time, matching §4.2's ordering
/// contract.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// A length-prefixed `Transport` over a plain TCP socket.
#[derive(Debug)]
pub struct TcpSession {
    stream: TcpStream,
}

impl TcpSession {
    /// Opens a new session to `addr`. Resolution is the caller's
    /// responsibility (see [`crate::address::Address::resolve`]); this takes
    /// an already-resolved socket address so connect failures are reported
    /// for the endpoint actually dialed.
    pub async fn connect(addr: SocketAddr) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| TransportError::ConnectFailed { addr, source })?;
        Ok(TcpSession { stream })
    }

    async fn write_frame(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let len = u32::try_from(bytes.len()).expect("frame exceeds u32::MAX bytes");
        self.stream.write_all(&len.to_be_bytes()).await?;
        self.stream.write_all(bytes).await?;
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut len_buf = [0u8; 4];
        match self.stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            // EOF with nothing read yet is the "server hung up without
            // replying" case §4.3 step 3 asks the engine to retry on.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(TransportError::Closed),
            Err(e) => return Err(TransportError::Io(e)),
        }
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => TransportError::Closed,
                _ => TransportError::Io(e),
            })?;
        Ok(payload)
    }
}

#[async_trait]
impl Transport for TcpSession {
    async fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.write_frame(request).await?;
        self.read_frame().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt as _;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn round_trips_a_request_and_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut len_buf = [0u8; 4];
            sock.read_exact(&mut len_buf).await.unwrap();
            let len = u32::from_be_bytes(len_buf) as usize;
            let mut req = vec![0u8; len];
            sock.read_exact(&mut req).await.unwrap();
            assert_eq!(req, b"ping");

            let reply = b"pong";
            sock.write_all(&(reply.len() as u32).to_be_bytes())
                .await
                .unwrap();
            sock.write_all(reply).await.unwrap();
        });

        let mut session = TcpSession::connect(addr).await.unwrap();
        let reply = session.send(b"ping").await.unwrap();
        assert_eq!(reply, b"pong");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn reports_closed_when_peer_hangs_up_without_replying() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            drop(sock);
        });

        let mut session = TcpSession::connect(addr).await.unwrap();
        let err = session.send(b"ping").await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn connect_failure_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // nothing listens here now

        let err = TcpSession::connect(addr).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectFailed { .. }));
    }
}
