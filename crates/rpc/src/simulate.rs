use bundler_entrypoint::abi::simulate_handle_op_calldata;
use bundler_entrypoint::reverts::ExecutionResultRevert;
use bundler_entrypoint::{decode_simulation_result, SimulationError};
use bundler_primitives::{Address, Bytes, UserOperation, U256};
use bundler_signer::Signer;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use jsonrpsee::types::ErrorObjectOwned;
use tracing::debug;

use crate::{CallRequest, EthApiClient};

#[derive(Debug, thiserror::Error)]
pub enum SimulateError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("simulateHandleOp did not revert")]
    NoRevert,
    #[error("call error carries no revert data: {0}")]
    MissingRevertData(String),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Revert data attached to a JSON-RPC call error, as a 0x-prefixed hex string.
pub fn revert_data(err: &ErrorObjectOwned) -> Option<String> {
    let data = err.data()?;
    serde_json::from_str::<String>(data.get()).ok()
}

/// Runs `simulateHandleOp` through `eth_estimateGas`, sent from `signer`.
///
/// Fees of the simulated operation are set to 1 wei. The EntryPoint always reverts from
/// this method, so the revert data is decoded into the result.
pub async fn simulate_handle_op<C>(
    client: &C,
    signer: &Signer,
    entry_point: Address,
    op: &UserOperation,
    target: Address,
    target_call_data: Bytes,
) -> Result<ExecutionResultRevert, SimulateError>
where
    C: ClientT + Send + Sync,
{
    let mut op = op.clone();
    op.max_fee_per_gas = U256::from(1);
    op.max_priority_fee_per_gas = U256::from(1);

    let request = CallRequest {
        from: Some(signer.address()),
        to: Some(entry_point),
        data: Some(simulate_handle_op_calldata(&op, target, target_call_data)),
        ..Default::default()
    };

    match client.estimate_gas(request).await {
        Ok(_) => Err(SimulateError::NoRevert),
        Err(ClientError::Call(err)) => {
            let data = revert_data(&err)
                .ok_or_else(|| SimulateError::MissingRevertData(err.message().to_string()))?;
            debug!(sender = %op.sender, %data, "simulateHandleOp reverted");
            Ok(decode_simulation_result(&data)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Gas needed by the factory to deploy the account, 0 for already deployed accounts.
pub async fn estimate_creation_gas<C>(
    client: &C,
    signer: &Signer,
    op: &UserOperation,
) -> Result<u64, ClientError>
where
    C: ClientT + Send + Sync,
{
    let Some(factory) = op.factory() else {
        return Ok(0);
    };

    let request = CallRequest {
        from: Some(signer.address()),
        to: Some(factory),
        value: Some(U256::ZERO),
        data: Some(op.factory_data()),
        ..Default::default()
    };
    let gas = client.estimate_gas(request).await?;
    Ok(gas.to::<u64>())
}
