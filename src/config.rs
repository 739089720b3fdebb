//! Configuration loading (C9).
//!
//! Mirrors this codebase's `env_required`/`env_parse_or` idiom: small
//! environment-variable helpers feeding one `from_env` entry point, failing
//! with a typed [`ConfigError`] rather than panicking on a bad deployment.

use std::env;
use std::time::Duration;

use crate::address::Address;
use crate::errors::ConfigError;

const CLUSTER_SEEDS: &str = "CLUSTER_SEEDS";
const CLUSTER_CONNECT_TIMEOUT_MS: &str = "CLUSTER_CONNECT_TIMEOUT_MS";
const CLUSTER_MIN_BACKOFF_MS: &str = "CLUSTER_MIN_BACKOFF_MS";
const CLUSTER_MAX_BACKOFF_MS: &str = "CLUSTER_MAX_BACKOFF_MS";

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;
const DEFAULT_MIN_BACKOFF_MS: u64 = 50;
const DEFAULT_MAX_BACKOFF_MS: u64 = 5000;

/// Everything a [`crate::leader_rpc::LeaderRpc`] needs to start talking to a
/// cluster, loaded from the process environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub seeds: Vec<Address>,
    pub connect_timeout: Duration,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let seeds = parse_seeds(&env_required(CLUSTER_SEEDS)?)?;
        let connect_timeout_ms = env_parse_or(CLUSTER_CONNECT_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS)?;
        let min_backoff_ms = env_parse_or(CLUSTER_MIN_BACKOFF_MS, DEFAULT_MIN_BACKOFF_MS)?;
        let max_backoff_ms = env_parse_or(CLUSTER_MAX_BACKOFF_MS, DEFAULT_MAX_BACKOFF_MS)?;

        Ok(ClientConfig {
            seeds,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            min_backoff: Duration::from_millis(min_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        })
    }
}

fn parse_seeds(raw: &str) -> Result<Vec<Address>, ConfigError> {
    let seeds = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Address::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigError::InvalidValue {
            var: CLUSTER_SEEDS.to_string(),
            message: e.to_string(),
        })?;

    if seeds.is_empty() {
        return Err(ConfigError::EmptySeedList {
            var: CLUSTER_SEEDS.to_string(),
        });
    }
    Ok(seeds)
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: name.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seeds_splits_and_trims() {
        let seeds = parse_seeds("127.0.0.1:5254, 127.0.0.1:5255").unwrap();
        assert_eq!(
            seeds,
            vec![Address::new("127.0.0.1", 5254), Address::new("127.0.0.1", 5255)]
        );
    }

    #[test]
    fn parse_seeds_rejects_empty_list() {
        assert!(matches!(parse_seeds(""), Err(ConfigError::EmptySeedList { .. })));
        assert!(matches!(parse_seeds("  ,  "), Err(ConfigError::EmptySeedList { .. })));
    }

    #[test]
    fn parse_seeds_rejects_malformed_entry() {
        assert!(matches!(
            parse_seeds("127.0.0.1:5254,not-an-address"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn env_parse_or_falls_back_to_default_when_unset() {
        env::remove_var("CLUSTER_RPC_TEST_UNSET_VAR");
        let value: u64 = env_parse_or("CLUSTER_RPC_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn env_parse_or_rejects_unparseable_value() {
        env::set_var("CLUSTER_RPC_TEST_BAD_VAR", "not-a-number");
        let result: Result<u64, ConfigError> = env_parse_or("CLUSTER_RPC_TEST_BAD_VAR", 1);
        env::remove_var("CLUSTER_RPC_TEST_BAD_VAR");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn env_required_reports_missing_var() {
        env::remove_var("CLUSTER_RPC_TEST_MISSING_VAR");
        assert!(matches!(
            env_required("CLUSTER_RPC_TEST_MISSING_VAR"),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
