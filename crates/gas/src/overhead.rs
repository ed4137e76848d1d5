use bundler_primitives::{Bytes, UserOperation, U256};

const DUMMY_SIGNATURE_LEN: usize = 65;

/// Gas the bundler spends on a user operation outside of its validation and execution.
#[derive(Clone, Debug)]
pub struct Overhead {
    /// Base cost of the bundle transaction, shared by all operations in the bundle.
    pub fixed: u64,
    pub per_user_op: u64,
    pub per_user_op_word: u64,
    /// Calldata cost of a zero byte.
    pub zero_byte: u64,
    /// Calldata cost of a non-zero byte.
    pub non_zero_byte: u64,
    /// Smallest bundle the fixed cost is spread over.
    pub min_bundle_size: u64,
    pub warm_storage_read: u64,
    pub non_zero_value_call: u64,
    pub call_opcode: u64,
    pub non_zero_value_stipend: u64,
    // Gas fields are replaced with these before packing, so that the estimate does not
    // shrink with the limits the caller happened to send.
    pub sanitized_pre_verification_gas: U256,
    pub sanitized_verification_gas_limit: U256,
    pub sanitized_call_gas_limit: U256,
}

impl Default for Overhead {
    fn default() -> Self {
        Self {
            fixed: 21000,
            per_user_op: 18300,
            per_user_op_word: 4,
            zero_byte: 4,
            non_zero_byte: 16,
            min_bundle_size: 1,
            warm_storage_read: 100,
            non_zero_value_call: 9000,
            call_opcode: 700,
            non_zero_value_stipend: 2300,
            sanitized_pre_verification_gas: U256::from(100_000),
            sanitized_verification_gas_limit: U256::from(1_000_000),
            sanitized_call_gas_limit: U256::from(1_000_000),
        }
    }
}

impl Overhead {
    /// Minimum `preVerificationGas` the bundler needs to be compensated for `op`.
    pub fn calc_pre_verification_gas(&self, op: &UserOperation) -> U256 {
        let sanitized = UserOperation {
            pre_verification_gas: self.sanitized_pre_verification_gas,
            verification_gas_limit: self.sanitized_verification_gas_limit,
            call_gas_limit: self.sanitized_call_gas_limit,
            signature: Bytes::from(vec![1u8; DUMMY_SIGNATURE_LEN]),
            ..op.clone()
        };
        let packed = sanitized.pack();

        let call_data_cost: u64 = packed
            .iter()
            .map(|b| {
                if *b == 0 {
                    self.zero_byte
                } else {
                    self.non_zero_byte
                }
            })
            .sum();
        let length_in_words = packed.len().div_ceil(32) as u64;

        let pvg = call_data_cost as f64
            + self.fixed as f64 / self.min_bundle_size.max(1) as f64
            + self.per_user_op as f64
            + (self.per_user_op_word * length_in_words) as f64;

        U256::from(pvg.round() as u64)
    }

    /// Gas of a call that transfers value, the floor for any `callGasLimit`.
    pub fn non_zero_value_call(&self) -> U256 {
        U256::from(self.non_zero_value_call + self.call_opcode + self.non_zero_value_stipend)
    }
}
