use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use super::EthRpc;
use crate::config::RpcConfig;
use crate::model::errors::RpcError;
use crate::model::eth_rpc::{BlockSelector, EthRpcBody, EthRpcResponse};

/// JSON-RPC over HTTP POST.
#[derive(Clone, Debug)]
pub struct HttpRpcClient {
    client: Client,
    url: String,
}

impl HttpRpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, body: &EthRpcBody) -> Result<Value, RpcError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: EthRpcResponse = serde_json::from_slice(&bytes)?;

        if let Some(error) = envelope.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        match envelope.result {
            Some(Value::Null) | None => Err(RpcError::MissingResult {
                method: body.method.clone(),
            }),
            Some(result) => {
                debug!(method = %body.method, "JSON-RPC call succeeded");
                Ok(result)
            }
        }
    }
}

#[async_trait]
impl EthRpc for HttpRpcClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn get_block_by_number(&self, block: &BlockSelector) -> Result<Value, RpcError> {
        self.call(&EthRpcBody::get_block_by_number(block)).await
    }

    #[instrument(skip(self, storage_keys), fields(slots = storage_keys.len()))]
    async fn get_proof(
        &self,
        address: &str,
        storage_keys: &[String],
        block: &BlockSelector,
    ) -> Result<Value, RpcError> {
        self.call(&EthRpcBody::get_proof(address, storage_keys, block))
            .await
    }
}
