use anyhow::Context;
use bundler_config::TestConfig;
use bundler_primitives::{Address, U256};
use bundler_rpc::client::{create_http_client, HttpClientConfig};
use bundler_rpc::gas_tip::{EthClientGasTip, GasTipProvider};
use bundler_rpc::{BundlerApiClient, EthApiClient};
use tracing::{debug, warn};

/// What the node and bundler of the test environment report about themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    pub chain_id: u64,
    pub signer: Address,
    pub entry_points: Vec<Address>,
    pub gas_tip: Option<U256>,
}

/// Connects to the node and the bundler named in `config` and checks that they serve
/// the same chain.
pub async fn probe(config: &TestConfig, http: HttpClientConfig) -> anyhow::Result<Environment> {
    let signer = config.signer().context("invalid signing key")?;

    let node = create_http_client(&config.node_url, http.clone())
        .with_context(|| format!("node client for {}", config.node_url))?;
    let bundler = create_http_client(&config.bundler_url, http)
        .with_context(|| format!("bundler client for {}", config.bundler_url))?;

    let chain_id = EthApiClient::chain_id(&node)
        .await
        .context("eth_chainId on node")?
        .to::<u64>();
    let bundler_chain_id = BundlerApiClient::chain_id(&bundler)
        .await
        .context("eth_chainId on bundler")?
        .to::<u64>();
    if bundler_chain_id != chain_id {
        anyhow::bail!("bundler serves chain {bundler_chain_id}, node serves chain {chain_id}");
    }

    let entry_points = bundler
        .supported_entry_points()
        .await
        .context("eth_supportedEntryPoints on bundler")?;
    if entry_points.is_empty() {
        warn!("Bundler reports no supported entry points");
    }

    let gas_tip = EthClientGasTip::new(node).gas_tip().await?;
    debug!(chain_id, ?gas_tip, "Probed node");

    Ok(Environment {
        chain_id,
        signer: signer.address(),
        entry_points,
        gas_tip,
    })
}
