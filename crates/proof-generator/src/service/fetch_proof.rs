use serde_json::Value;
use tracing::{debug, instrument};

use crate::model::errors::{ProofError, RpcError};
use crate::model::eth_rpc::{BlockSelector, EthProofResponse};
use crate::model::target::ProofTarget;
use crate::rpc::EthRpc;

/// Undecoded `eth_getProof` material for one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawProof {
    pub address: String,
    /// Hex-encoded nodes, root to leaf.
    pub account_proof: Vec<String>,
    /// One entry per requested slot, in request order.
    pub storage_proofs: Vec<RawStorageProof>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawStorageProof {
    pub key: String,
    pub proof: Vec<String>,
}

/// Requests the account and storage proofs of `target` at a verified block.
#[instrument(skip(rpc, target), fields(address = %target.address()))]
pub async fn fetch_proof<R: EthRpc + ?Sized>(
    rpc: &R,
    block_number: u64,
    target: &ProofTarget,
) -> Result<RawProof, ProofError> {
    let storage_keys = target.storage_keys();
    let result = rpc
        .get_proof(
            target.address(),
            &storage_keys,
            &BlockSelector::Number(block_number),
        )
        .await
        .map_err(|source| ProofError::ProofFetch {
            address: target.address().to_string(),
            source,
        })?;

    let proof = parse_proof_response(target.address(), result, Some(&storage_keys))?;
    debug!(
        account_nodes = proof.account_proof.len(),
        storage_proofs = proof.storage_proofs.len(),
        "Fetched proof"
    );
    Ok(proof)
}

/// Extracts the proof node lists from an `eth_getProof` result.
///
/// When `requested` is given, the response must carry exactly one storage
/// proof per requested key; their keys are taken from the request so the
/// order is the caller's.
pub fn parse_proof_response(
    address: &str,
    result: Value,
    requested: Option<&[String]>,
) -> Result<RawProof, ProofError> {
    let fetch_error = |reason: String| ProofError::ProofFetch {
        address: address.to_string(),
        source: RpcError::InvalidResponse(reason),
    };

    let response: EthProofResponse =
        serde_json::from_value(result).map_err(|e| fetch_error(e.to_string()))?;

    if response.account_proof.is_empty() {
        return Err(fetch_error("empty accountProof".to_string()));
    }

    if let Some(keys) = requested {
        if keys.len() != response.storage_proof.len() {
            return Err(fetch_error(format!(
                "requested {} storage proofs, received {}",
                keys.len(),
                response.storage_proof.len()
            )));
        }
    }

    let storage_proofs = response
        .storage_proof
        .into_iter()
        .enumerate()
        .map(|(i, storage)| {
            let key = match requested {
                Some(keys) => keys[i].clone(),
                None => match storage.key {
                    Some(Value::String(key)) => key,
                    Some(other) => other.to_string(),
                    None => String::new(),
                },
            };
            RawStorageProof {
                key,
                proof: storage.proof,
            }
        })
        .collect();

    Ok(RawProof {
        address: address.to_string(),
        account_proof: response.account_proof,
        storage_proofs,
    })
}
