use bundler_entrypoint::{RpcError, RpcErrorCode};
use bundler_gas::{GasEstimate, Overhead, SimulationFailure};
use bundler_primitives::{Address, Bytes, UserOperation, U256};
use bundler_signer::Signer;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::ClientError;
use tracing::debug;

use crate::simulate::{simulate_handle_op, SimulateError};

const VERIFICATION_GAS_STEP: u64 = 10_000;
const CALL_GAS_STEP: u64 = 100_000;
const VERIFICATION_GAS_MARGIN: u64 = 30_000;
const CALL_GAS_MARGIN: u64 = 500_000;

/// Limits of [`estimate_gas_no_trace`].
#[derive(Clone, Debug)]
pub struct NoTraceConfig {
    /// The verification gas limit is never raised past this.
    pub max_verification_gas: u64,
    pub initial_verification_gas: u64,
    pub initial_call_gas: u64,
}

impl Default for NoTraceConfig {
    fn default() -> Self {
        Self {
            max_verification_gas: 6_000_000,
            initial_verification_gas: 90_000,
            initial_call_gas: 1_000_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error(transparent)]
    Rejected(#[from] RpcError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Estimates gas limits with plain `simulateHandleOp` calls, for nodes without a tracer.
///
/// Starting from generous limits, the verification gas limit is raised in steps while
/// validation runs out of gas, then the call gas limit is lowered in steps while the
/// account cannot prefund the operation. The call gas limit never drops below the cost
/// of a value transferring call.
pub async fn estimate_gas_no_trace<C>(
    client: &C,
    signer: &Signer,
    entry_point: Address,
    op: &UserOperation,
    ov: &Overhead,
    config: &NoTraceConfig,
) -> Result<GasEstimate, EstimateError>
where
    C: ClientT + Send + Sync,
{
    if op.max_fee_per_gas.is_zero() {
        return Err(invalid_fields("maxFeePerGas must be more than 0"));
    }

    let mut vgl = config.initial_verification_gas;
    let mut cgl = config.initial_call_gas;
    let mut sim_op = op.clone();
    sim_op.verification_gas_limit = U256::from(vgl);
    sim_op.call_gas_limit = U256::from(cgl);
    let mut failure = simulate(client, signer, entry_point, &sim_op).await?;

    while let Some(err) = failure.take_if(|err| err.is_validation_oog()) {
        if vgl >= config.max_verification_gas {
            return Err(invalid_fields(format!(
                "verificationGasLimit is too high, max is {}, err: {err}",
                config.max_verification_gas
            )));
        }
        vgl += VERIFICATION_GAS_STEP;
        sim_op.verification_gas_limit = U256::from(vgl);
        failure = simulate(client, signer, entry_point, &sim_op).await?;
    }

    let floor = ov.non_zero_value_call();
    while let Some(err) = failure.take_if(|err| err.is_prefund_not_paid()) {
        let Some(lower) = cgl
            .checked_sub(CALL_GAS_STEP)
            .filter(|lower| U256::from(*lower) >= floor)
        else {
            return Err(invalid_fields(format!(
                "callGasLimit is too low, min is {floor}, err: {err}"
            )));
        };
        cgl = lower;
        sim_op.call_gas_limit = U256::from(cgl);
        failure = simulate(client, signer, entry_point, &sim_op).await?;
    }

    if let Some(err) = failure {
        return Err(invalid_fields(format!("gas failed {err}, vGasLimit: {vgl}")));
    }
    debug!(sender = %op.sender, vgl, cgl, "Simulation passed");

    if cgl > CALL_GAS_MARGIN {
        cgl -= CALL_GAS_MARGIN;
    }
    Ok(GasEstimate {
        verification_gas_limit: vgl.saturating_sub(VERIFICATION_GAS_MARGIN),
        call_gas_limit: cgl,
    })
}

fn invalid_fields(message: impl Into<String>) -> EstimateError {
    RpcError::new(RpcErrorCode::InvalidFields, message).into()
}

/// Runs one simulation. Transport errors are returned, every other failure is handed
/// back as its reason for classification.
async fn simulate<C>(
    client: &C,
    signer: &Signer,
    entry_point: Address,
    op: &UserOperation,
) -> Result<Option<SimulationFailure>, ClientError>
where
    C: ClientT + Send + Sync,
{
    match simulate_handle_op(client, signer, entry_point, op, Address::ZERO, Bytes::new()).await {
        Ok(_) => Ok(None),
        Err(SimulateError::Client(err)) => Err(err),
        Err(err) => Ok(Some(SimulationFailure::new(err.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::{SolCall, SolError};
    use bundler_entrypoint::abi::IEntryPoint;
    use bundler_entrypoint::RpcErrorCode;
    use bundler_gas::{GasEstimate, Overhead};
    use bundler_primitives::{address, hex, Address, Bytes, UserOperation, U256};
    use bundler_signer::Signer;
    use jsonrpsee::types::{ErrorObjectOwned, Params};
    use jsonrpsee::RpcModule;

    use super::{estimate_gas_no_trace, EstimateError, NoTraceConfig};
    use crate::client::{create_http_client, HttpClientConfig};
    use crate::test_utils::start_server;
    use crate::CallRequest;

    const ENTRY_POINT: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

    /// Account as seen by the EntryPoint of a mock node. Fees are 1 wei during
    /// simulation, so the prefund is the sum of the limits.
    #[derive(Clone, Copy)]
    struct MockAccount {
        verification_gas: u64,
        balance: u64,
        failure: Option<&'static str>,
    }

    impl MockAccount {
        fn revert(&self, op: &IEntryPoint::simulateHandleOpCall) -> Vec<u8> {
            let op = &op.op;
            let reason = if let Some(reason) = self.failure {
                Some(reason)
            } else if op.verificationGasLimit < U256::from(self.verification_gas) {
                Some("AA23 reverted (or OOG)")
            } else if (op.verificationGasLimit + op.callGasLimit + op.preVerificationGas)
                * op.maxFeePerGas
                > U256::from(self.balance)
            {
                Some("AA21 didn't pay prefund")
            } else {
                None
            };

            match reason {
                Some(reason) => IEntryPoint::FailedOp {
                    opIndex: U256::ZERO,
                    reason: reason.to_string(),
                }
                .abi_encode(),
                None => IEntryPoint::ExecutionResult {
                    preOpGas: op.preVerificationGas + U256::from(self.verification_gas),
                    paid: U256::ZERO,
                    validAfter: Default::default(),
                    validUntil: Default::default(),
                    targetSuccess: true,
                    targetResult: Bytes::new(),
                }
                .abi_encode(),
            }
        }
    }

    fn node(account: MockAccount) -> RpcModule<()> {
        let mut module = RpcModule::new(());
        module
            .register_method("eth_estimateGas", move |params: Params, _, _| {
                let (request,): (CallRequest,) = params.parse()?;
                let call = IEntryPoint::simulateHandleOpCall::abi_decode(
                    &request.data.unwrap_or_default(),
                    true,
                )
                .map_err(|err| ErrorObjectOwned::owned::<()>(-32602, err.to_string(), None))?;
                Err::<u64, _>(ErrorObjectOwned::owned(
                    3,
                    "execution reverted",
                    Some(hex::encode_prefixed(account.revert(&call))),
                ))
            })
            .unwrap();
        module
    }

    fn account(verification_gas: u64, balance: u64) -> MockAccount {
        MockAccount {
            verification_gas,
            balance,
            failure: None,
        }
    }

    fn signer() -> Signer {
        Signer::from_str("c6cbc5ffad570fdad0544d1b5358a36edeb98d163b6567912ac4754e144d4edb")
            .unwrap()
    }

    fn op() -> UserOperation {
        UserOperation {
            max_fee_per_gas: U256::from(10),
            ..Default::default()
        }
    }

    async fn estimate(
        account: MockAccount,
        op: &UserOperation,
        config: &NoTraceConfig,
    ) -> Result<GasEstimate, EstimateError> {
        let (client, _handle) = start_server(node(account)).await;
        estimate_gas_no_trace(
            &client,
            &signer(),
            ENTRY_POINT,
            op,
            &Overhead::default(),
            config,
        )
        .await
    }

    fn rejection(err: EstimateError) -> (RpcErrorCode, String) {
        let EstimateError::Rejected(err) = err else {
            panic!("expected rejection, got {err:?}");
        };
        (err.code, err.message)
    }

    #[tokio::test]
    async fn steps_both_limits() {
        // Validation passes from 130k, the call fits the balance from 600k.
        let estimate = estimate(account(125_000, 800_000), &op(), &NoTraceConfig::default())
            .await
            .unwrap();
        assert_eq!(
            estimate,
            GasEstimate {
                verification_gas_limit: 100_000,
                call_gas_limit: 100_000,
            }
        );
    }

    #[tokio::test]
    async fn initial_limits_pass() {
        let estimate = estimate(account(50_000, u64::MAX), &op(), &NoTraceConfig::default())
            .await
            .unwrap();
        assert_eq!(
            estimate,
            GasEstimate {
                verification_gas_limit: 60_000,
                call_gas_limit: 500_000,
            }
        );
    }

    #[tokio::test]
    async fn zero_max_fee_is_rejected() {
        let op = UserOperation {
            max_fee_per_gas: U256::ZERO,
            ..op()
        };
        let err = estimate(account(50_000, u64::MAX), &op, &NoTraceConfig::default())
            .await
            .unwrap_err();
        assert_eq!(
            rejection(err),
            (
                RpcErrorCode::InvalidFields,
                "maxFeePerGas must be more than 0".to_string()
            )
        );
    }

    #[tokio::test]
    async fn verification_gas_above_max() {
        let config = NoTraceConfig {
            max_verification_gas: 100_000,
            ..Default::default()
        };
        let err = estimate(account(125_000, u64::MAX), &op(), &config)
            .await
            .unwrap_err();
        assert_eq!(
            rejection(err),
            (
                RpcErrorCode::InvalidFields,
                "verificationGasLimit is too high, max is 100000, err: AA23 reverted (or OOG)"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn call_gas_stops_at_value_transfer_floor() {
        let err = estimate(account(50_000, 100_000), &op(), &NoTraceConfig::default())
            .await
            .unwrap_err();
        assert_eq!(
            rejection(err),
            (
                RpcErrorCode::InvalidFields,
                "callGasLimit is too low, min is 12000, err: AA21 didn't pay prefund".to_string()
            )
        );
    }

    #[tokio::test]
    async fn unexpected_failure() {
        let account = MockAccount {
            failure: Some("AA10 sender already constructed"),
            ..account(50_000, u64::MAX)
        };
        let err = estimate(account, &op(), &NoTraceConfig::default())
            .await
            .unwrap_err();
        assert_eq!(
            rejection(err),
            (
                RpcErrorCode::InvalidFields,
                "gas failed AA10 sender already constructed, vGasLimit: 90000".to_string()
            )
        );
    }

    #[tokio::test]
    async fn transport_errors_are_returned() {
        // Nothing listens on port 1.
        let client =
            create_http_client("http://127.0.0.1:1", HttpClientConfig::default()).unwrap();
        let err = estimate_gas_no_trace(
            &client,
            &signer(),
            ENTRY_POINT,
            &op(),
            &Overhead::default(),
            &NoTraceConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EstimateError::Client(_)));
    }
}
