use async_trait::async_trait;
use bundler_entrypoint::{RpcError, RpcErrorCode};
use bundler_primitives::{UserOperation, U256};
use tracing::{debug, warn};

use crate::Overhead;

/// Outcome of simulating a user operation against the EntryPoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simulation {
    /// Gas used up to and including validation, plus `preVerificationGas`.
    pub pre_op_gas: U256,
    /// Gas limit the execution phase actually needed, as seen by the tracer.
    pub execution_gas_limit: u64,
}

/// Failed simulation. `reason` is the EntryPoint or tracer message, e.g.
/// `AA21 didn't pay prefund`. Failures during execution still report the
/// validation result in `simulation`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct SimulationFailure {
    pub reason: String,
    pub simulation: Option<Simulation>,
}

impl SimulationFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            simulation: None,
        }
    }

    pub fn with_simulation(mut self, simulation: Simulation) -> Self {
        self.simulation = Some(simulation);
        self
    }

    /// Account or paymaster could not cover the maximum cost, limits are too high.
    pub fn is_prefund_not_paid(&self) -> bool {
        self.reason.starts_with("AA21")
            || self.reason.starts_with("AA31")
            || self.reason.contains("balance too low")
    }

    /// Validation ran out of gas, `verificationGasLimit` is too low.
    pub fn is_validation_oog(&self) -> bool {
        self.reason.starts_with("AA13")
            || self.reason.contains("validation OOG")
            || self.reason.starts_with("AA23")
            || self.reason.contains("AA33 reverted (or OOG)")
            || self.reason.starts_with("AA40")
            || self.reason.starts_with("AA41")
    }

    pub fn is_execution_oog(&self) -> bool {
        self.reason.contains("execution OOG")
    }

    pub fn is_execution_reverted(&self) -> bool {
        self.reason.contains("execution reverted")
    }
}

/// Runs `simulateHandleOp` for a candidate operation.
#[async_trait]
pub trait Simulator: Send + Sync {
    async fn simulate(&self, op: &UserOperation) -> Result<Simulation, SimulationFailure>;
}

#[derive(Clone, Debug)]
pub struct EstimatorConfig {
    /// Upper bound of both searched gas limits.
    pub max_gas_limit: u64,
    /// The fallback call gas search stops once its range is narrower than this.
    pub fallback_search_cutoff: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_gas_limit: 25_000_000,
            fallback_search_cutoff: 30_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasEstimate {
    pub verification_gas_limit: u64,
    pub call_gas_limit: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum GasError {
    #[error(transparent)]
    Rejected(#[from] RpcError),
    #[error(transparent)]
    Simulation(#[from] SimulationFailure),
}

/// Estimates `verificationGasLimit` and `callGasLimit` by repeatedly simulating `op`.
///
/// The verification limit is searched with real fees, since a zero gas price skips code
/// paths that pay the prefund. The call limit is then taken from a zero fee simulation
/// with the maximum limit, and confirmed with real fees. If that confirmation fails, the
/// call limit is searched between the traced value and the maximum.
pub async fn estimate_gas<S: Simulator>(
    simulator: &S,
    op: &UserOperation,
    ov: &Overhead,
    config: &EstimatorConfig,
) -> Result<GasEstimate, GasError> {
    if op.max_fee_per_gas.is_zero() {
        return Err(RpcError::new(
            RpcErrorCode::InvalidFields,
            "maxFeePerGas must be more than 0",
        )
        .into());
    }

    let mut sim_op = op.clone();
    sim_op.max_priority_fee_per_gas = op.max_fee_per_gas;
    sim_op.verification_gas_limit = U256::ZERO;
    sim_op.call_gas_limit = U256::ZERO;

    let vgl = search_verification_gas(simulator, &mut sim_op, op, config).await?;
    sim_op.verification_gas_limit = vgl;
    debug!(sender = %op.sender, %vgl, "Found verificationGasLimit");

    sim_op.max_fee_per_gas = U256::ZERO;
    sim_op.max_priority_fee_per_gas = U256::ZERO;
    sim_op.call_gas_limit = U256::from(config.max_gas_limit);
    let traced = simulator.simulate(&sim_op).await?;

    let mut cgl = U256::from(traced.execution_gas_limit);
    if cgl < ov.non_zero_value_call() {
        cgl = ov.non_zero_value_call();
    }

    // Value transfers need to be affordable once the real gas price is applied.
    sim_op.max_fee_per_gas = op.max_fee_per_gas;
    sim_op.max_priority_fee_per_gas = op.max_fee_per_gas;
    sim_op.call_gas_limit = cgl;
    match simulator.simulate(&sim_op).await {
        Ok(_) => Ok(GasEstimate {
            verification_gas_limit: vgl.saturating_to::<u64>(),
            call_gas_limit: cgl.saturating_to::<u64>(),
        }),
        Err(err) if err.is_execution_oog() || err.is_execution_reverted() => {
            // Contracts forwarding a fixed gas discount, e.g. `sub(gas(), STATIC_DISCOUNT)`,
            // are not accounted for by the tracer.
            warn!(sender = %op.sender, %cgl, %err, "Traced callGasLimit failed, searching");
            let lower = cgl.saturating_to::<u64>();
            let call_gas_limit =
                search_call_gas(simulator, &mut sim_op, lower, err, config).await?;
            Ok(GasEstimate {
                verification_gas_limit: vgl.saturating_to::<u64>(),
                call_gas_limit,
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// Binary search for the lowest verification gas that neither runs out of gas nor
/// exceeds what the account can prefund. `callGasLimit` is 0 here, so execution OOG
/// is expected and accepted.
async fn search_verification_gas<S: Simulator>(
    simulator: &S,
    sim_op: &mut UserOperation,
    op: &UserOperation,
    config: &EstimatorConfig,
) -> Result<U256, GasError> {
    let mut l = 0u64;
    let mut r = config.max_gas_limit;
    let mut last_err = None;

    while l <= r {
        let m = l + (r - l) / 2;
        sim_op.verification_gas_limit = U256::from(m);

        let simulation = match simulator.simulate(sim_op).await {
            Ok(simulation) => simulation,
            Err(err) if err.is_prefund_not_paid() => {
                last_err = Some(err);
                match m.checked_sub(1) {
                    Some(lower) => r = lower,
                    None => break,
                }
                continue;
            }
            Err(err) if err.is_validation_oog() => {
                last_err = Some(err);
                l = m + 1;
                continue;
            }
            Err(err) if err.is_execution_oog() => match err.simulation.clone() {
                Some(simulation) => simulation,
                None => return Err(err.into()),
            },
            Err(err) => return Err(err.into()),
        };

        return Ok(simulation
            .pre_op_gas
            .saturating_sub(op.pre_verification_gas));
    }

    Err(last_err
        .unwrap_or_else(|| SimulationFailure::new("verificationGasLimit search exhausted"))
        .into())
}

/// Binary search for a passing call gas limit in `[lower, max_gas_limit]`, stopping once
/// the range is narrower than the cutoff.
async fn search_call_gas<S: Simulator>(
    simulator: &S,
    sim_op: &mut UserOperation,
    lower: u64,
    initial_err: SimulationFailure,
    config: &EstimatorConfig,
) -> Result<u64, GasError> {
    let mut l = lower;
    let mut r = config.max_gas_limit;
    let mut found = None;
    let mut last_err = initial_err;

    while r >= l && r - l >= config.fallback_search_cutoff {
        let m = l + (r - l) / 2;
        sim_op.call_gas_limit = U256::from(m);

        match simulator.simulate(sim_op).await {
            Ok(_) => {
                found = Some(m);
                match m.checked_sub(1) {
                    Some(lower) => r = lower,
                    None => break,
                }
            }
            Err(err) if err.is_execution_oog() || err.is_execution_reverted() => {
                last_err = err;
                l = m + 1;
            }
            Err(err) if err.is_prefund_not_paid() => {
                last_err = err;
                match m.checked_sub(1) {
                    Some(lower) => r = lower,
                    None => break,
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    found.ok_or_else(|| last_err.into())
}
