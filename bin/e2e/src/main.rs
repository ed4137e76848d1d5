use std::time::Duration;

use bundler_config::config;
use bundler_e2e::probe;
use bundler_rpc::client::HttpClientConfig;
use bundler_tracing::initialize_tracing;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    initialize_tracing(Level::INFO);

    let config = config();
    config.validate()?;
    info!(node = %config.node_url, bundler = %config.bundler_url, "Probing test environment");

    let environment =
        probe(config, HttpClientConfig::default().timeout(Duration::from_secs(10))).await?;
    info!(
        chain_id = environment.chain_id,
        signer = %environment.signer,
        entry_points = ?environment.entry_points,
        gas_tip = ?environment.gas_tip,
        "Test environment is reachable"
    );

    Ok(())
}
