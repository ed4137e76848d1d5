use crate::errors::{RpcError, RpcErrorCode};
use crate::reverts::{ExecutionResultRevert, FailedOpRevert, FailedStrRevert, RevertError};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The EntryPoint or the account refused the operation.
    #[error(transparent)]
    Rejected(#[from] RpcError),
    #[error("{execution_result}, {failed_op}, {failed_str}")]
    Undecodable {
        execution_result: RevertError,
        failed_op: RevertError,
        failed_str: RevertError,
    },
}

/// Interprets the revert data of a `simulateHandleOp` call.
///
/// `ExecutionResult` is the success case. `FailedOp` and `Error(string)` become a
/// rejection carrying the revert reason. Anything else is reported with all three
/// decoding failures.
pub fn decode_simulation_result(data: &str) -> Result<ExecutionResultRevert, SimulationError> {
    let execution_result = match ExecutionResultRevert::decode(data) {
        Ok(result) => return Ok(result),
        Err(err) => err,
    };

    let failed_op = match FailedOpRevert::decode(data) {
        Ok(revert) => {
            return Err(RpcError::new(RpcErrorCode::RejectedByEpOrAccount, &revert.reason)
                .with_data(&revert)
                .into())
        }
        Err(err) => err,
    };

    match FailedStrRevert::decode(data) {
        Ok(revert) => Err(
            RpcError::new(RpcErrorCode::RejectedByEpOrAccount, &revert.reason)
                .with_data(&revert)
                .into(),
        ),
        Err(failed_str) => Err(SimulationError::Undecodable {
            execution_result,
            failed_op,
            failed_str,
        }),
    }
}

#[cfg(test)]
mod tests {
    use bundler_primitives::U256;

    use super::{decode_simulation_result, SimulationError};
    use crate::errors::RpcErrorCode;
    use crate::reverts::tests::{EXECUTION_RESULT, FAILED_OP, FAILED_STR};

    #[test]
    fn execution_result_is_success() {
        let result = decode_simulation_result(EXECUTION_RESULT).unwrap();
        assert_eq!(result.pre_op_gas, U256::from(50_000));
    }

    #[test]
    fn failed_op_is_rejection() {
        let Err(SimulationError::Rejected(err)) = decode_simulation_result(FAILED_OP) else {
            panic!("expected rejection");
        };
        assert_eq!(err.code, RpcErrorCode::RejectedByEpOrAccount);
        assert_eq!(err.message, "AA21 didn't pay prefund");
        let data = err.data.unwrap();
        assert_eq!(data["reason"], "AA21 didn't pay prefund");
        assert_eq!(data["opIndex"], "0x0");
    }

    #[test]
    fn failed_str_is_rejection() {
        let Err(SimulationError::Rejected(err)) = decode_simulation_result(FAILED_STR) else {
            panic!("expected rejection");
        };
        assert_eq!(err.message, "AA21 didn't pay prefund");
    }

    #[test]
    fn unknown_revert() {
        let err = decode_simulation_result("0xdeadbeef").unwrap_err();
        let SimulationError::Undecodable { .. } = &err else {
            panic!("expected undecodable, got {err:?}");
        };
        let message = err.to_string();
        assert!(message.contains("executionResult"));
        assert!(message.contains("failedOp"));
        assert!(message.contains("failedStr"));
    }
}
