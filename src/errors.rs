//! Typed, recoverable error taxonomy.
//!
//! Fatal protocol violations (unknown status byte, version mismatch, malformed
//! request/response) are *not* represented here — those are diagnosed with
//! `panic!` at the call site (see `leader_rpc`) because a `Result` a caller
//! could match past would contradict the invariant it signals.

use thiserror::Error;

/// Errors parsing or resolving an [`crate::address::Address`].
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address '{0}' is missing a ':port' suffix")]
    MissingPort(String),

    #[error("invalid port in address '{0}': {1}")]
    InvalidPort(String, std::num::ParseIntError),

    #[error("address '{0}' has an empty host")]
    EmptyHost(String),
}

/// Errors decoding a wire frame (C1).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("frame shorter than the {0}-byte header")]
    MalformedFrame(usize),
}

/// Errors loading [`crate::config::ClientConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("{var} must list at least one seed address")]
    EmptySeedList { var: String },
}

/// A session-level error surfaced to the caller of [`crate::leader_rpc::LeaderRpc::call`].
///
/// `SESSION_EXPIRED` is the one status code this crate treats as recoverable
/// at the RPC-engine layer: the engine itself is session-agnostic, so it
/// hands the condition back rather than retrying or panicking.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CallError {
    #[error("session expired")]
    SessionExpired,
}
