//! Address and endpoint resolution (C7).
//!
//! Parses `host:port` hints exchanged over the wire and on the command line,
//! and classifies the ones that can never be dialed ("sucky": port `0` or a
//! host that does not resolve) so the leader-discovery engine can fall
//! through to its seed list after a single wasted probe instead of getting
//! stuck on a bad hint.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use tokio::net::lookup_host;

use crate::errors::AddressError;

/// A hostname-or-IP plus a port, as exchanged in `NOT_LEADER` hints and seed
/// lists. Parsing never resolves DNS — use [`Address::resolve`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses `"host:port"`. The host may itself contain no further colons
    /// (IPv6 literals are out of scope for this crate's hint format, matching
    /// the spec's plain `host:port` wire representation).
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let (host, port_str) = s
            .rsplit_once(':')
            .ok_or_else(|| AddressError::MissingPort(s.to_string()))?;

        if host.is_empty() {
            return Err(AddressError::EmptyHost(s.to_string()));
        }

        let port: u16 = port_str
            .parse()
            .map_err(|e| AddressError::InvalidPort(s.to_string(), e))?;

        Ok(Address {
            host: host.to_string(),
            port,
        })
    }

    /// A port of `0` is never dialable; such an address is "sucky" on sight,
    /// with no need to touch the network.
    pub fn is_zero_port(&self) -> bool {
        self.port == 0
    }

    /// Resolves this address to concrete socket addresses via the system
    /// resolver. Returns an empty vector (never an error) for a host that
    /// does not resolve — that absence of endpoints *is* how the caller
    /// tells "sucky" apart from "usable".
    pub async fn resolve(&self) -> Vec<SocketAddr> {
        match lookup_host((self.host.as_str(), self.port)).await {
            Ok(iter) => iter.collect(),
            Err(_) => Vec::new(),
        }
    }

    /// "Sucky": legal to receive as a hint but unusable — a zero port, or a
    /// host that the resolver cannot turn into any socket address.
    pub async fn is_sucky(&self) -> bool {
        self.is_zero_port() || self.resolve().await.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}
