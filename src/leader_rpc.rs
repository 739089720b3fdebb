//! LeaderRPC engine (C3) — the hard part.
//!
//! `LeaderRpc::call` hides leadership changes, stale connections, and
//! advisory redirect hints behind a "just call the leader" contract: it
//! blocks until the cluster answers, retrying connection loss and
//! `NOT_LEADER` redirects indefinitely, and panics with a stable diagnostic
//! for anything that signals the two sides disagree about the protocol.
//!
//! Each retry attempt opens its own [`Transport`] rather than caching one
//! across iterations — §4.2 allows either ("reuse it; otherwise, resolve and
//! connect"), and not caching sidesteps sharing a `&mut self` transport
//! across concurrent callers. The only state shared between calls is the
//! probable-leader address itself, guarded by a [`tokio::sync::Mutex`] and
//! touched only to read or update it, never held across network I/O — this
//! is what makes concurrent in-flight `call`s safe without risking deadlock.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::errors::CallError;
use crate::transport::{TcpSession, Transport, TransportError};
use crate::wire::{decode_response, encode_request, OpCode, Status, WIRE_VERSION};

/// Opens a [`Transport`] to a resolved socket address. The production path
/// (`TcpConnector`) dials a real `TcpStream`; tests may substitute a
/// connector that fails on command to exercise the retry loop without a
/// flaky real listener.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, addr: SocketAddr) -> Result<Box<dyn Transport>, TransportError>;
}

/// The default [`Connector`]: a real length-prefixed TCP session.
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(TcpSession::connect(addr).await?))
    }
}

/// Routes logical RPCs to the cluster leader, masking redirects and
/// connection churn from the caller.
pub struct LeaderRpc {
    seeds: Vec<Address>,
    probable_leader: Mutex<Address>,
    seed_cursor: AtomicUsize,
    connector: Box<dyn Connector>,
    connect_timeout: Duration,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl LeaderRpc {
    /// Builds an engine that dials real TCP sockets, starting with the first
    /// seed as the probable leader.
    pub fn new(
        seeds: Vec<Address>,
        connect_timeout: Duration,
        min_backoff: Duration,
        max_backoff: Duration,
    ) -> Self {
        Self::with_connector(
            seeds,
            connect_timeout,
            min_backoff,
            max_backoff,
            Box::new(TcpConnector),
        )
    }

    /// Builds an engine with a caller-supplied [`Connector`], for tests that
    /// want to simulate connect failures without a real listener.
    pub fn with_connector(
        seeds: Vec<Address>,
        connect_timeout: Duration,
        min_backoff: Duration,
        max_backoff: Duration,
        connector: Box<dyn Connector>,
    ) -> Self {
        assert!(!seeds.is_empty(), "LeaderRpc requires at least one seed address");
        let first = seeds[0].clone();
        Self {
            seeds,
            probable_leader: Mutex::new(first),
            seed_cursor: AtomicUsize::new(0),
            connector,
            connect_timeout,
            min_backoff,
            max_backoff,
        }
    }

    /// Sends `request` to whichever server is currently leader and decodes a
    /// successful reply as `Resp`. Blocks until the cluster answers OK or
    /// `SESSION_EXPIRED`; panics on any fatal protocol violation (§4.3, §7).
    pub async fn call<Req, Resp>(&self, op_code: OpCode, request: &Req) -> Result<Resp, CallError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload =
            serde_json::to_vec(request).expect("request message type must be JSON-serializable");
        let frame = encode_request(WIRE_VERSION, op_code, &payload);
        let mut backoff = self.min_backoff;

        loop {
            let addr = self.current_target().await;

            let endpoint = match addr.resolve().await.into_iter().next() {
                Some(e) => e,
                None => {
                    warn!(%addr, "endpoint does not resolve, falling back to next seed");
                    self.advance_to_next_seed().await;
                    self.sleep_backoff(&mut backoff).await;
                    continue;
                }
            };

            let mut session = match tokio::time::timeout(
                self.connect_timeout,
                self.connector.connect(endpoint),
            )
            .await
            {
                Ok(Ok(s)) => s,
                Ok(Err(e)) => {
                    warn!(%addr, error = %e, "connect failed, retrying");
                    self.advance_to_next_seed().await;
                    self.sleep_backoff(&mut backoff).await;
                    continue;
                }
                Err(_) => {
                    warn!(%addr, timeout_ms = %self.connect_timeout.as_millis(), "connect timed out, retrying");
                    self.advance_to_next_seed().await;
                    self.sleep_backoff(&mut backoff).await;
                    continue;
                }
            };

            let response = match session.send(&frame).await {
                Ok(r) => r,
                Err(TransportError::Closed) => {
                    info!(%addr, "peer closed the connection before replying, retrying");
                    self.advance_to_next_seed().await;
                    self.sleep_backoff(&mut backoff).await;
                    continue;
                }
                Err(e) => {
                    warn!(%addr, error = %e, "transport error, retrying");
                    self.advance_to_next_seed().await;
                    self.sleep_backoff(&mut backoff).await;
                    continue;
                }
            };

            let (status_byte, body) = decode_response(&response)
                .unwrap_or_else(|e| panic!("Could not parse server response: {e}"));

            match Status::from_u8(status_byte) {
                Some(Status::Ok) => {
                    let decoded: Resp = serde_json::from_slice(body)
                        .unwrap_or_else(|e| panic!("Could not parse server response: {e}"));
                    self.set_probable_leader(addr).await;
                    return Ok(decoded);
                }
                Some(Status::InvalidVersion) => {
                    panic!(
                        "client is too old: server rejected wire version {WIRE_VERSION}"
                    );
                }
                Some(Status::InvalidRequest) => {
                    panic!("request for {op_code:?} was invalid");
                }
                Some(Status::NotLeader) => {
                    match parse_hint(body) {
                        Some(hint) if !hint.is_sucky().await => {
                            info!(from = %addr, %hint, "following leader hint");
                            self.set_probable_leader(hint).await;
                        }
                        Some(sucky_hint) => {
                            debug!(from = %addr, hint = %sucky_hint, "hint is sucky, falling back to seed list");
                            self.advance_to_next_seed().await;
                        }
                        None => {
                            debug!(from = %addr, "not leader, no hint, falling back to seed list");
                            self.advance_to_next_seed().await;
                        }
                    }
                    self.sleep_backoff(&mut backoff).await;
                    continue;
                }
                Some(Status::SessionExpired) => {
                    return Err(CallError::SessionExpired);
                }
                None => {
                    panic!("Unknown status: {status_byte}");
                }
            }
        }
    }

    async fn current_target(&self) -> Address {
        self.probable_leader.lock().await.clone()
    }

    async fn set_probable_leader(&self, addr: Address) {
        *self.probable_leader.lock().await = addr;
    }

    async fn advance_to_next_seed(&self) {
        let idx = self.seed_cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let next = self.seeds[idx % self.seeds.len()].clone();
        self.set_probable_leader(next).await;
    }

    /// Sleeps the current backoff (plus a little jitter so a round-robin herd
    /// doesn't retry in lockstep), then grows it, capped at `max_backoff`.
    async fn sleep_backoff(&self, backoff: &mut Duration) {
        let jitter_ceiling_ms = (backoff.as_millis() as u64 / 5).max(1);
        let jitter_ms = rand::thread_rng().gen_range(0..jitter_ceiling_ms);
        tokio::time::sleep(*backoff + Duration::from_millis(jitter_ms)).await;
        *backoff = (*backoff * 2).min(self.max_backoff);
    }
}

/// Parses the `NOT_LEADER` response payload: a null-terminated `host:port`
/// string, or an empty body meaning "no hint". A hint that fails to parse is
/// treated the same as no hint — a malformed hint must never block progress.
fn parse_hint(body: &[u8]) -> Option<Address> {
    if body.is_empty() {
        return None;
    }
    let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
    let text = std::str::from_utf8(&body[..end]).ok()?;
    if text.is_empty() {
        return None;
    }
    Address::parse(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hint_reads_null_terminated_string() {
        let mut body = b"127.0.0.1:5254".to_vec();
        body.push(0);
        assert_eq!(parse_hint(&body), Some(Address::new("127.0.0.1", 5254)));
    }

    #[test]
    fn parse_hint_on_empty_body_is_none() {
        assert_eq!(parse_hint(&[]), None);
    }

    #[test]
    fn parse_hint_without_terminator_still_parses() {
        assert_eq!(parse_hint(b"host:1"), Some(Address::new("host", 1)));
    }

    #[test]
    fn parse_hint_on_garbage_is_none() {
        assert_eq!(parse_hint(&[0xff, 0xfe]), None);
    }
}
