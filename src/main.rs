//! Smoke-test binary (C12): loads configuration, opens a `LeaderRpc`, and
//! issues one `GetSupportedRpcVersions` call to prove the stack is live
//! against a real cluster. Deliberately thin — the library, not this
//! binary, is the unit under test.

use cluster_rpc::config::ClientConfig;
use cluster_rpc::leader_rpc::LeaderRpc;
use cluster_rpc::wire::OpCode;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct SupportedVersions {
    min: u32,
    max: u32,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(seeds = ?config.seeds, "connecting to cluster");

    let engine = LeaderRpc::new(
        config.seeds,
        config.connect_timeout,
        config.min_backoff,
        config.max_backoff,
    );

    let versions: SupportedVersions = engine
        .call(OpCode::GetSupportedRpcVersions, &json!({}))
        .await
        .expect("GetSupportedRpcVersions does not use sessions and cannot expire one");

    tracing::info!(min = versions.min, max = versions.max, "cluster is live");
}
