mod user_operation;

pub use alloy_primitives::{
    address, b256, bytes, hex, keccak256, Address, Bytes, ChainId, PrimitiveSignature, B256,
    U256, U64,
};
pub use user_operation::UserOperation;
