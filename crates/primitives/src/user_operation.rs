use alloy_primitives::{keccak256, Address, Bytes, ChainId, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// User operation as accepted by the v0.6 EntryPoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

impl UserOperation {
    /// ABI encodes all fields as a parameter sequence.
    /// This is the byte string the bundler pays calldata for when it submits the operation.
    pub fn pack(&self) -> Vec<u8> {
        (
            self.sender,
            self.nonce,
            self.init_code.clone(),
            self.call_data.clone(),
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            self.paymaster_and_data.clone(),
            self.signature.clone(),
        )
            .abi_encode_params()
    }

    /// Computes the ERC-4337 user operation hash for the given entry point and chain.
    ///
    /// Dynamic fields are replaced by their keccak256 hashes, the result is hashed, and that
    /// hash is encoded together with the entry point address and chain id and hashed again.
    pub fn hash(&self, entry_point: Address, chain_id: ChainId) -> B256 {
        let packed = (
            self.sender,
            self.nonce,
            keccak256(&self.init_code),
            keccak256(&self.call_data),
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            keccak256(&self.paymaster_and_data),
        )
            .abi_encode();

        keccak256((keccak256(packed), entry_point, U256::from(chain_id)).abi_encode())
    }

    /// Factory address encoded in the first 20 bytes of `init_code`.
    pub fn factory(&self) -> Option<Address> {
        if self.init_code.len() < 20 {
            return None;
        }
        Some(Address::from_slice(&self.init_code[..20]))
    }

    /// Calldata passed to the factory, everything after the factory address.
    pub fn factory_data(&self) -> Bytes {
        if self.init_code.len() < 20 {
            return Bytes::new();
        }
        Bytes::from(self.init_code[20..].to_vec())
    }
}
