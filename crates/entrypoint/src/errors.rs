use serde::Serialize;

/// JSON-RPC error codes defined by ERC-4337 for `eth_sendUserOperation`
/// and `eth_estimateUserOperationGas`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum RpcErrorCode {
    InvalidFields = -32602,
    RejectedByEpOrAccount = -32500,
    RejectedByPaymaster = -32501,
    BannedOpcode = -32502,
    ShortDeadline = -32503,
    BannedOrThrottledEntity = -32504,
    StakeOrDelayTooLow = -32505,
    UnsupportedAggregator = -32506,
    InvalidSignature = -32507,
    ExecutionReverted = -32521,
}

impl RpcErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Rejection reported back to the bundler caller.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RpcError {
    pub code: RpcErrorCode,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches a serializable payload, usually the decoded revert.
    /// A payload that fails to serialize is dropped.
    pub fn with_data(mut self, data: &impl Serialize) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }
}
