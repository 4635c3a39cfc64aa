use ethereum_types::H256;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::block_header::{BlockHeader, RpcBlockHeader};
use crate::error::HeaderError;

/// A header whose recomputed hash matched the hash reported by the endpoint.
///
/// The only way to obtain one is through [`verify_header`], so holding a
/// `VerifiedHeader` is proof that the check ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedHeader {
    header: BlockHeader,
    hash: H256,
    encoded: Vec<u8>,
}

impl VerifiedHeader {
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn hash(&self) -> H256 {
        self.hash
    }

    pub fn number(&self) -> u64 {
        self.header.number()
    }

    /// The canonical RLP encoding whose digest is [`Self::hash`].
    pub fn rlp_bytes(&self) -> &[u8] {
        &self.encoded
    }

    pub fn into_header(self) -> BlockHeader {
        self.header
    }
}

/// Canonicalizes an RPC header, recomputes its hash and compares it with the
/// hash the endpoint reported.
pub fn verify_header(rpc_header: &RpcBlockHeader) -> Result<VerifiedHeader, HeaderError> {
    let claimed = rpc_header
        .hash
        .to_bytes()
        .map_err(|e| HeaderError::invalid_field("hash", e))?;
    if claimed.len() != 32 {
        return Err(HeaderError::invalid_field(
            "hash",
            format!("expected 32 bytes, got {}", claimed.len()),
        ));
    }
    let claimed = H256::from_slice(&claimed);

    let header = BlockHeader::from_rpc(rpc_header)?;
    let encoded = header.rlp_encode();
    let computed = crate::block_header::keccak256(&encoded);

    if computed != claimed {
        warn!(
            number = header.number(),
            ?claimed,
            ?computed,
            "Block hash does not match the header contents"
        );
        return Err(HeaderError::IntegrityMismatch { claimed, computed });
    }

    debug!(number = header.number(), hash = ?computed, "Block header verified");
    Ok(VerifiedHeader {
        header,
        hash: computed,
        encoded,
    })
}

/// Same as [`verify_header`], starting from the raw JSON `result` object.
pub fn verify_header_json(value: &serde_json::Value) -> Result<VerifiedHeader, HeaderError> {
    let rpc_header = RpcBlockHeader::deserialize(value)?;
    verify_header(&rpc_header)
}
