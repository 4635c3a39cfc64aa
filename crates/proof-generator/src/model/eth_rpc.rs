use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ProofError;

pub const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
pub const GET_PROOF: &str = "eth_getProof";

/// Block argument of a JSON-RPC call: a sentinel tag or a concrete number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockSelector {
    #[default]
    Latest,
    Earliest,
    Number(u64),
}

impl BlockSelector {
    /// The string form the endpoint expects, e.g. `latest` or `0xb0fa43`.
    pub fn to_rpc_param(&self) -> String {
        match self {
            BlockSelector::Latest => "latest".to_string(),
            BlockSelector::Earliest => "earliest".to_string(),
            BlockSelector::Number(number) => format!("0x{:x}", number),
        }
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rpc_param())
    }
}

/// Accepts `latest`, `earliest`, a decimal number or a `0x` hex number.
impl FromStr for BlockSelector {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "latest" => Ok(BlockSelector::Latest),
            "earliest" => Ok(BlockSelector::Earliest),
            _ => {
                let parsed = match s.strip_prefix("0x") {
                    Some(digits) => u64::from_str_radix(digits, 16),
                    None => s.parse::<u64>(),
                };
                parsed
                    .map(BlockSelector::Number)
                    .map_err(|e| ProofError::InvalidRequest(format!("block `{}`: {}", s, e)))
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EthRpcBody {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<EthRpcBodyParams>,
    pub id: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum EthRpcBodyParams {
    BlockIdentifier(String),
    IncludeTransactions(bool),
    AccountAddress(String),
    StorageKeys(Vec<String>),
}

impl EthRpcBody {
    fn new(method: &str, params: Vec<EthRpcBodyParams>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        }
    }

    /// `eth_getBlockByNumber(block, true)`.
    pub fn get_block_by_number(block: &BlockSelector) -> Self {
        Self::new(
            GET_BLOCK_BY_NUMBER,
            vec![
                EthRpcBodyParams::BlockIdentifier(block.to_rpc_param()),
                EthRpcBodyParams::IncludeTransactions(true),
            ],
        )
    }

    /// `eth_getProof(address, storageKeys, block)`, in the order the endpoint requires.
    pub fn get_proof(address: &str, storage_keys: &[String], block: &BlockSelector) -> Self {
        Self::new(
            GET_PROOF,
            vec![
                EthRpcBodyParams::AccountAddress(address.to_string()),
                EthRpcBodyParams::StorageKeys(storage_keys.to_vec()),
                EthRpcBodyParams::BlockIdentifier(block.to_rpc_param()),
            ],
        )
    }
}

/// JSON-RPC response envelope. A `null` result deserializes as `None`.
#[derive(Deserialize, Debug)]
pub struct EthRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<EthRpcErrorObject>,
}

#[derive(Deserialize, Debug)]
pub struct EthRpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// The parts of an `eth_getProof` result this crate consumes.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EthProofResponse {
    pub account_proof: Vec<String>,
    pub storage_proof: Vec<EthStorageProof>,
}

#[derive(Deserialize, Debug)]
pub struct EthStorageProof {
    #[serde(default)]
    pub key: Option<Value>,
    pub proof: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_selector_parsing() {
        assert_eq!("latest".parse::<BlockSelector>().unwrap(), BlockSelector::Latest);
        assert_eq!(
            "earliest".parse::<BlockSelector>().unwrap(),
            BlockSelector::Earliest
        );
        assert_eq!(
            "11598403".parse::<BlockSelector>().unwrap(),
            BlockSelector::Number(0xb0fa43)
        );
        assert_eq!(
            "0xB0FA43".parse::<BlockSelector>().unwrap(),
            BlockSelector::Number(0xb0fa43)
        );
        assert!("pending-ish".parse::<BlockSelector>().is_err());
        assert!("0x".parse::<BlockSelector>().is_err());
    }

    #[test]
    fn test_block_selector_param() {
        assert_eq!(BlockSelector::Number(0xb0fa43).to_rpc_param(), "0xb0fa43");
        assert_eq!(BlockSelector::Number(0).to_rpc_param(), "0x0");
        assert_eq!(BlockSelector::Latest.to_string(), "latest");
    }

    #[test]
    fn test_get_block_by_number_body() {
        let body = EthRpcBody::get_block_by_number(&BlockSelector::Latest);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["latest", true],
                "id": 1
            })
        );
    }

    #[test]
    fn test_get_proof_body_param_order() {
        let body = EthRpcBody::get_proof(
            "0x6b175474e89094c44da98b954eedeac495271d0f",
            &["0x0".to_string(), "0x1".to_string()],
            &BlockSelector::Number(0xb0fa43),
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap()["params"],
            json!([
                "0x6b175474e89094c44da98b954eedeac495271d0f",
                ["0x0", "0x1"],
                "0xb0fa43"
            ])
        );
    }

    #[test]
    fn test_null_result() {
        let response: EthRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert!(response.result.is_none());
        assert!(response.error.is_none());
    }
}
