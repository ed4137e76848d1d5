pub mod client;
pub mod estimate;
pub mod gas_tip;
pub mod simulate;
pub mod types;

#[cfg(test)]
mod test_utils;

use bundler_primitives::{Address, UserOperation, B256, U256, U64};
use jsonrpsee::proc_macros::rpc;
pub use types::*;

/// Subset of the node API used by the toolkit.
#[rpc(client, namespace = "eth")]
pub trait EthApi {
    #[method(name = "chainId")]
    async fn chain_id(&self) -> jsonrpsee::core::RpcResult<U64>;

    #[method(name = "maxPriorityFeePerGas")]
    async fn max_priority_fee_per_gas(&self) -> jsonrpsee::core::RpcResult<U256>;

    #[method(name = "estimateGas")]
    async fn estimate_gas(&self, request: CallRequest) -> jsonrpsee::core::RpcResult<U64>;
}

/// ERC-4337 bundler API.
#[rpc(client, namespace = "eth")]
pub trait BundlerApi {
    #[method(name = "chainId")]
    async fn chain_id(&self) -> jsonrpsee::core::RpcResult<U64>;

    #[method(name = "supportedEntryPoints")]
    async fn supported_entry_points(&self) -> jsonrpsee::core::RpcResult<Vec<Address>>;

    #[method(name = "sendUserOperation")]
    async fn send_user_operation(
        &self,
        op: UserOperation,
        entry_point: Address,
    ) -> jsonrpsee::core::RpcResult<B256>;

    #[method(name = "estimateUserOperationGas")]
    async fn estimate_user_operation_gas(
        &self,
        op: UserOperation,
        entry_point: Address,
    ) -> jsonrpsee::core::RpcResult<UserOperationGasEstimate>;
}
