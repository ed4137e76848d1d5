use alloy_sol_types::{sol, SolCall};
use bundler_primitives::{Address, Bytes};

sol! {
    #[derive(Debug, Default, PartialEq, Eq)]
    struct UserOperation {
        address sender;
        uint256 nonce;
        bytes initCode;
        bytes callData;
        uint256 callGasLimit;
        uint256 verificationGasLimit;
        uint256 preVerificationGas;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        bytes paymasterAndData;
        bytes signature;
    }

    interface IEntryPoint {
        error ExecutionResult(
            uint256 preOpGas,
            uint256 paid,
            uint48 validAfter,
            uint48 validUntil,
            bool targetSuccess,
            bytes targetResult
        );

        error FailedOp(uint256 opIndex, string reason);

        function simulateHandleOp(
            UserOperation calldata op,
            address target,
            bytes calldata targetCallData
        ) external;
    }
}

impl From<&bundler_primitives::UserOperation> for UserOperation {
    fn from(op: &bundler_primitives::UserOperation) -> Self {
        Self {
            sender: op.sender,
            nonce: op.nonce,
            initCode: op.init_code.clone(),
            callData: op.call_data.clone(),
            callGasLimit: op.call_gas_limit,
            verificationGasLimit: op.verification_gas_limit,
            preVerificationGas: op.pre_verification_gas,
            maxFeePerGas: op.max_fee_per_gas,
            maxPriorityFeePerGas: op.max_priority_fee_per_gas,
            paymasterAndData: op.paymaster_and_data.clone(),
            signature: op.signature.clone(),
        }
    }
}

/// Calldata of `simulateHandleOp(op, target, targetCallData)`.
pub fn simulate_handle_op_calldata(
    op: &bundler_primitives::UserOperation,
    target: Address,
    target_call_data: Bytes,
) -> Bytes {
    IEntryPoint::simulateHandleOpCall {
        op: op.into(),
        target,
        targetCallData: target_call_data,
    }
    .abi_encode()
    .into()
}

#[cfg(test)]
mod tests {
    use bundler_primitives::{hex, Address, Bytes, UserOperation};

    use super::simulate_handle_op_calldata;

    #[test]
    fn simulate_handle_op_selector() {
        let calldata =
            simulate_handle_op_calldata(&UserOperation::default(), Address::ZERO, Bytes::new());
        assert_eq!(hex::encode(&calldata[..4]), "d6383f94");
    }

    #[test]
    fn calldata_embeds_packed_operation() {
        let op = UserOperation {
            call_data: Bytes::from(vec![0xab; 4]),
            ..Default::default()
        };
        let calldata = simulate_handle_op_calldata(&op, Address::ZERO, Bytes::new());
        // selector, 3 head words, the operation tuple, the empty target calldata.
        assert_eq!(calldata.len(), 4 + 3 * 32 + op.pack().len() + 32);
    }
}
