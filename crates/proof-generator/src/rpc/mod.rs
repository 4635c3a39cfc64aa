mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::errors::RpcError;
use crate::model::eth_rpc::BlockSelector;

pub use http::HttpRpcClient;

/// The two remote procedures the proof pipeline depends on.
///
/// Implementations return the JSON `result` member untouched; interpreting
/// it is left to the caller. No retries happen at this level.
#[async_trait]
pub trait EthRpc: Send + Sync {
    /// `eth_getBlockByNumber(block, true)`.
    async fn get_block_by_number(&self, block: &BlockSelector) -> Result<Value, RpcError>;

    /// `eth_getProof(address, storage_keys, block)`.
    async fn get_proof(
        &self,
        address: &str,
        storage_keys: &[String],
        block: &BlockSelector,
    ) -> Result<Value, RpcError>;
}

#[async_trait]
impl<T: EthRpc + ?Sized> EthRpc for Arc<T> {
    async fn get_block_by_number(&self, block: &BlockSelector) -> Result<Value, RpcError> {
        (**self).get_block_by_number(block).await
    }

    async fn get_proof(
        &self,
        address: &str,
        storage_keys: &[String],
        block: &BlockSelector,
    ) -> Result<Value, RpcError> {
        (**self).get_proof(address, storage_keys, block).await
    }
}
