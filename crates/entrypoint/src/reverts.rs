use alloy_sol_types::{Revert, SolError};
use bundler_primitives::{hex, Bytes, U256};
use serde::Serialize;

use crate::abi::IEntryPoint;

#[derive(Debug, thiserror::Error)]
pub enum RevertError {
    #[error("revert data is missing 0x prefix: {0}")]
    Missing0xPrefix(String),
    #[error("revert data is not hex: {0}")]
    FromHex(#[from] hex::FromHexError),
    #[error("{name}: {source}")]
    Abi {
        name: &'static str,
        source: alloy_sol_types::Error,
    },
}

/// Result of a successful `simulateHandleOp`, which the EntryPoint always reports as a revert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResultRevert {
    pub pre_op_gas: U256,
    pub paid: U256,
    pub valid_after: u64,
    pub valid_until: u64,
    pub target_success: bool,
    pub target_result: Bytes,
}

/// `FailedOp(uint256 opIndex, string reason)` raised by the EntryPoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedOpRevert {
    pub op_index: U256,
    pub reason: String,
}

/// Plain solidity `Error(string)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedStrRevert {
    pub reason: String,
}

fn revert_bytes(data: &str) -> Result<Vec<u8>, RevertError> {
    let Some(data) = data.strip_prefix("0x") else {
        return Err(RevertError::Missing0xPrefix(data.to_string()));
    };
    Ok(hex::decode(data)?)
}

impl ExecutionResultRevert {
    pub fn decode(data: &str) -> Result<Self, RevertError> {
        let revert = IEntryPoint::ExecutionResult::abi_decode(&revert_bytes(data)?, true)
            .map_err(|source| RevertError::Abi {
                name: "executionResult",
                source,
            })?;

        Ok(Self {
            pre_op_gas: revert.preOpGas,
            paid: revert.paid,
            valid_after: revert.validAfter.to::<u64>(),
            valid_until: revert.validUntil.to::<u64>(),
            target_success: revert.targetSuccess,
            target_result: revert.targetResult,
        })
    }
}

impl FailedOpRevert {
    pub fn decode(data: &str) -> Result<Self, RevertError> {
        let revert = IEntryPoint::FailedOp::abi_decode(&revert_bytes(data)?, true).map_err(
            |source| RevertError::Abi {
                name: "failedOp",
                source,
            },
        )?;

        Ok(Self {
            op_index: revert.opIndex,
            reason: revert.reason,
        })
    }
}

impl FailedStrRevert {
    pub fn decode(data: &str) -> Result<Self, RevertError> {
        let revert = Revert::abi_decode(&revert_bytes(data)?, true).map_err(|source| {
            RevertError::Abi {
                name: "failedStr",
                source,
            }
        })?;

        Ok(Self {
            reason: revert.reason,
        })
    }
}
