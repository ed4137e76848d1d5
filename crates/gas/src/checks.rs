use bundler_entrypoint::{RpcError, RpcErrorCode};
use bundler_primitives::{UserOperation, U256};

use crate::Overhead;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("verificationGasLimit: exceeds maxVerificationGas of {max}")]
    VerificationGasTooHigh { max: U256 },
    #[error("preVerificationGas: below expected gas of {expected}:{actual}")]
    PreVerificationGasTooLow { expected: U256, actual: U256 },
}

impl From<CheckError> for RpcError {
    fn from(err: CheckError) -> Self {
        RpcError::new(RpcErrorCode::InvalidFields, err.to_string())
    }
}

/// Checks that `verificationGasLimit` is at most `max_verification_gas` and that
/// `preVerificationGas` covers the calldata cost plus fixed overhead.
///
/// Operations that deploy their account are exempt from the verification limit.
pub fn validate_verification_gas(
    op: &UserOperation,
    ov: &Overhead,
    max_verification_gas: U256,
) -> Result<(), CheckError> {
    if op.verification_gas_limit > max_verification_gas && op.init_code.is_empty() {
        return Err(CheckError::VerificationGasTooHigh {
            max: max_verification_gas,
        });
    }

    let pvg = ov.calc_pre_verification_gas(op);
    if op.pre_verification_gas < pvg {
        return Err(CheckError::PreVerificationGasTooLow {
            expected: pvg,
            actual: op.pre_verification_gas,
        });
    }

    Ok(())
}
