use async_trait::async_trait;
use bundler_primitives::{U256, U64};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use tracing::debug;

use crate::EthApiClient;

/// Chain id of local development nodes (anvil, hardhat).
pub const LOCAL_CHAIN_ID: u64 = 31337;
/// Tip used on local chains, where the node suggestion is meaningless.
pub const LOCAL_GAS_TIP: u64 = 10_000_000;

#[derive(Debug, thiserror::Error)]
pub enum GasTipError {
    #[error("gas tip query failed: {0}")]
    Client(#[from] ClientError),
}

/// Source of the priority fee expected to get a transaction included in time.
#[async_trait]
pub trait GasTipProvider: Send + Sync {
    async fn gas_tip(&self) -> Result<Option<U256>, GasTipError>;
}

/// Provides no tip at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopGasTip;

#[async_trait]
impl GasTipProvider for NoopGasTip {
    async fn gas_tip(&self) -> Result<Option<U256>, GasTipError> {
        Ok(None)
    }
}

/// Asks the node for `eth_maxPriorityFeePerGas`, except on local chains.
#[derive(Clone, Debug)]
pub struct EthClientGasTip<C> {
    client: C,
}

impl<C> EthClientGasTip<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> GasTipProvider for EthClientGasTip<C>
where
    C: ClientT + Send + Sync,
{
    async fn gas_tip(&self) -> Result<Option<U256>, GasTipError> {
        let chain_id = self.client.chain_id().await?;
        if chain_id == U64::from(LOCAL_CHAIN_ID) {
            debug!(%chain_id, "Local chain, using fixed gas tip");
            return Ok(Some(U256::from(LOCAL_GAS_TIP)));
        }

        let tip = self.client.max_priority_fee_per_gas().await?;
        debug!(%chain_id, %tip, "Suggested gas tip");
        Ok(Some(tip))
    }
}
