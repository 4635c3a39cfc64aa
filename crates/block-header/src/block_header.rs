use ethereum_types::H256;
use rlp::{Encodable, RlpStream};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::constants::{HeaderEra, LEGACY_FIELD_COUNT};
use crate::error::HeaderError;
use crate::hex::HexQuantity;

/// Block header as returned by `eth_getBlockByNumber`.
///
/// Only the fields that make up the hash preimage (plus `hash` itself) are
/// read; everything else in the response is ignored. Trailing fork fields are
/// optional and a JSON `null` counts as absent.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlockHeader {
    pub hash: HexQuantity,
    pub parent_hash: HexQuantity,
    pub sha3_uncles: HexQuantity,
    pub miner: HexQuantity,
    pub state_root: HexQuantity,
    pub transactions_root: HexQuantity,
    pub receipts_root: HexQuantity,
    pub logs_bloom: HexQuantity,
    pub difficulty: HexQuantity,
    pub number: HexQuantity,
    pub gas_limit: HexQuantity,
    pub gas_used: HexQuantity,
    pub timestamp: HexQuantity,
    pub extra_data: HexQuantity,
    pub mix_hash: HexQuantity,
    pub nonce: HexQuantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<HexQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawals_root: Option<HexQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<HexQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excess_blob_gas: Option<HexQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_beacon_block_root: Option<HexQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_hash: Option<HexQuantity>,
}

/// A block header reduced to its canonical byte fields, in hash preimage order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub parent_hash: Vec<u8>,
    pub ommers_hash: Vec<u8>,
    pub beneficiary: Vec<u8>,
    pub state_root: Vec<u8>,
    pub transactions_root: Vec<u8>,
    pub receipts_root: Vec<u8>,
    pub logs_bloom: Vec<u8>,
    pub difficulty: Vec<u8>,
    pub number: Vec<u8>,
    pub gas_limit: Vec<u8>,
    pub gas_used: Vec<u8>,
    pub timestamp: Vec<u8>,
    pub extra_data: Vec<u8>,
    pub mix_hash: Vec<u8>,
    pub nonce: Vec<u8>,
    /// Trailing fork fields, in fork order. Never contains a gap: a later
    /// field is only present if all earlier ones are.
    pub base_fee_per_gas: Option<Vec<u8>>,
    pub withdrawals_root: Option<Vec<u8>>,
    pub blob_gas_used: Option<Vec<u8>>,
    pub excess_blob_gas: Option<Vec<u8>>,
    pub parent_beacon_block_root: Option<Vec<u8>>,
    pub requests_hash: Option<Vec<u8>>,
}

impl BlockHeader {
    /// Canonicalizes every field of an RPC header.
    ///
    /// Hashes, addresses, the bloom filter and the nonce keep their full width;
    /// integer fields are reduced to minimal big-endian form with zero as the
    /// empty string.
    pub fn from_rpc(rpc_header: &RpcBlockHeader) -> Result<Self, HeaderError> {
        let number = quantity("number", &rpc_header.number)?;
        if number.len() > 8 {
            return Err(HeaderError::invalid_field(
                "number",
                "block number does not fit in 64 bits",
            ));
        }

        let header = BlockHeader {
            parent_hash: fixed("parentHash", &rpc_header.parent_hash, 32)?,
            ommers_hash: fixed("sha3Uncles", &rpc_header.sha3_uncles, 32)?,
            beneficiary: fixed("miner", &rpc_header.miner, 20)?,
            state_root: fixed("stateRoot", &rpc_header.state_root, 32)?,
            transactions_root: fixed("transactionsRoot", &rpc_header.transactions_root, 32)?,
            receipts_root: fixed("receiptsRoot", &rpc_header.receipts_root, 32)?,
            logs_bloom: fixed("logsBloom", &rpc_header.logs_bloom, 256)?,
            difficulty: quantity("difficulty", &rpc_header.difficulty)?,
            number,
            gas_limit: quantity("gasLimit", &rpc_header.gas_limit)?,
            gas_used: quantity("gasUsed", &rpc_header.gas_used)?,
            timestamp: quantity("timestamp", &rpc_header.timestamp)?,
            extra_data: data("extraData", &rpc_header.extra_data)?,
            mix_hash: fixed("mixHash", &rpc_header.mix_hash, 32)?,
            nonce: fixed("nonce", &rpc_header.nonce, 8)?,
            base_fee_per_gas: rpc_header
                .base_fee_per_gas
                .as_ref()
                .map(|v| quantity("baseFeePerGas", v))
                .transpose()?,
            withdrawals_root: rpc_header
                .withdrawals_root
                .as_ref()
                .map(|v| fixed("withdrawalsRoot", v, 32))
                .transpose()?,
            blob_gas_used: rpc_header
                .blob_gas_used
                .as_ref()
                .map(|v| quantity("blobGasUsed", v))
                .transpose()?,
            excess_blob_gas: rpc_header
                .excess_blob_gas
                .as_ref()
                .map(|v| quantity("excessBlobGas", v))
                .transpose()?,
            parent_beacon_block_root: rpc_header
                .parent_beacon_block_root
                .as_ref()
                .map(|v| fixed("parentBeaconBlockRoot", v, 32))
                .transpose()?,
            requests_hash: rpc_header
                .requests_hash
                .as_ref()
                .map(|v| fixed("requestsHash", v, 32))
                .transpose()?,
        };
        header.check_trailing_fields()?;

        let expected = HeaderEra::for_mainnet_block(header.number()).field_count();
        if header.field_count() != expected {
            // Other chains schedule forks differently, so this is not an error.
            tracing::debug!(
                number = header.number(),
                fields = header.field_count(),
                expected,
                "header shape differs from the mainnet fork schedule"
            );
        }

        Ok(header)
    }

    /// Parses and canonicalizes a raw `eth_getBlockByNumber` result.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, HeaderError> {
        let rpc_header = RpcBlockHeader::deserialize(value)?;
        Self::from_rpc(&rpc_header)
    }

    /// The block number as an integer.
    pub fn number(&self) -> u64 {
        self.number
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
    }

    /// All fields in hash preimage order.
    pub fn fields(&self) -> Vec<&[u8]> {
        let mut fields: Vec<&[u8]> = vec![
            &self.parent_hash,
            &self.ommers_hash,
            &self.beneficiary,
            &self.state_root,
            &self.transactions_root,
            &self.receipts_root,
            &self.logs_bloom,
            &self.difficulty,
            &self.number,
            &self.gas_limit,
            &self.gas_used,
            &self.timestamp,
            &self.extra_data,
            &self.mix_hash,
            &self.nonce,
        ];
        fields.extend(self.trailing_fields().into_iter().flatten());
        fields
    }

    pub fn field_count(&self) -> usize {
        LEGACY_FIELD_COUNT + self.trailing_fields().iter().flatten().count()
    }

    /// Encodes the header using RLP encoding.
    pub fn rlp_encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    /// Computes the hash of the block header.
    pub fn compute_hash(&self) -> H256 {
        keccak256(&self.rlp_encode())
    }

    fn trailing_fields(&self) -> [Option<&[u8]>; 6] {
        [
            self.base_fee_per_gas.as_deref(),
            self.withdrawals_root.as_deref(),
            self.blob_gas_used.as_deref(),
            self.excess_blob_gas.as_deref(),
            self.parent_beacon_block_root.as_deref(),
            self.requests_hash.as_deref(),
        ]
    }

    fn check_trailing_fields(&self) -> Result<(), HeaderError> {
        const NAMES: [&str; 6] = [
            "baseFeePerGas",
            "withdrawalsRoot",
            "blobGasUsed",
            "excessBlobGas",
            "parentBeaconBlockRoot",
            "requestsHash",
        ];
        let present = self.trailing_fields().map(|field| field.is_some());
        if let Some(gap) = present.iter().position(|p| !p) {
            if let Some(offset) = present[gap..].iter().position(|p| *p) {
                return Err(HeaderError::invalid_field(
                    NAMES[gap + offset],
                    format!("present while `{}` is absent", NAMES[gap]),
                ));
            }
        }
        Ok(())
    }
}

impl Encodable for BlockHeader {
    fn rlp_append(&self, stream: &mut RlpStream) {
        let fields = self.fields();
        stream.begin_list(fields.len());
        for field in fields {
            stream.append(&field);
        }
    }
}

/// Keccak-256 digest, the hash used for headers and trie nodes.
pub fn keccak256(bytes: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(bytes))
}

fn quantity(field: &'static str, value: &HexQuantity) -> Result<Vec<u8>, HeaderError> {
    value
        .canonicalize()
        .map_err(|e| HeaderError::invalid_field(field, e))
}

fn data(field: &'static str, value: &HexQuantity) -> Result<Vec<u8>, HeaderError> {
    value
        .to_bytes()
        .map_err(|e| HeaderError::invalid_field(field, e))
}

fn fixed(field: &'static str, value: &HexQuantity, width: usize) -> Result<Vec<u8>, HeaderError> {
    if let HexQuantity::Int(_) = value {
        return Err(HeaderError::invalid_field(
            field,
            "expected a hex string, got an integer",
        ));
    }
    let bytes = data(field, value)?;
    if bytes.len() != width {
        return Err(HeaderError::invalid_field(
            field,
            format!("expected {} bytes, got {}", width, bytes.len()),
        ));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn genesis_json() -> serde_json::Value {
        json!({
            "hash": "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3",
            "parentHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
            "miner": "0x0000000000000000000000000000000000000000",
            "stateRoot": "0xd7f8974fb5ac78d9ac099b9ad5018bedc2ce0a72dad1827a1709da30580f0544",
            "transactionsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "receiptsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "difficulty": "0x400000000",
            "number": "0x0",
            "gasLimit": "0x1388",
            "gasUsed": "0x0",
            "timestamp": "0x0",
            "extraData": "0x11bbe8db4e347b4e8c937c1c8370e4b5ed33adb3db69cbdb7a38e1e50b1b82fa",
            "mixHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "nonce": "0x0000000000000042",
            "size": "0x21c",
            "transactions": [],
            "uncles": []
        })
    }

    #[test]
    fn test_genesis_hash() {
        let header = BlockHeader::from_json(&genesis_json()).unwrap();
        assert_eq!(header.field_count(), 15);
        assert_eq!(header.number(), 0);
        assert!(header.number.is_empty());
        assert!(header.gas_used.is_empty());
        assert_eq!(header.difficulty, vec![4, 0, 0, 0, 0]);
        assert_eq!(header.nonce, vec![0, 0, 0, 0, 0, 0, 0, 0x42]);
        assert_eq!(
            format!("{:?}", header.compute_hash()),
            "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
        );
    }

    #[test]
    fn test_zero_quantity_encodes_as_empty_string() {
        let header = BlockHeader::from_json(&genesis_json()).unwrap();
        let encoded = header.rlp_encode();
        let rlp = rlp::Rlp::new(&encoded);
        assert_eq!(rlp.item_count().unwrap(), 15);
        // number, gasUsed and timestamp are zero
        for index in [8, 10, 11] {
            assert_eq!(rlp.at(index).unwrap().as_raw(), &[0x80]);
        }
    }

    #[test]
    fn test_base_fee_only_when_present() {
        let mut value = genesis_json();
        let without = BlockHeader::from_json(&value).unwrap();
        value["baseFeePerGas"] = json!("0x0");
        let with = BlockHeader::from_json(&value).unwrap();
        assert_eq!(with.field_count(), 16);
        assert_eq!(with.base_fee_per_gas, Some(vec![]));
        assert_ne!(with.rlp_encode(), without.rlp_encode());

        value["baseFeePerGas"] = serde_json::Value::Null;
        let null = BlockHeader::from_json(&value).unwrap();
        assert_eq!(null.rlp_encode(), without.rlp_encode());
    }

    #[test]
    fn test_native_integers_match_hex_strings() {
        let mut value = genesis_json();
        value["difficulty"] = json!(17_179_869_184u64);
        value["gasLimit"] = json!(5000);
        value["timestamp"] = json!(0);
        let header = BlockHeader::from_json(&value).unwrap();
        assert_eq!(
            format!("{:?}", header.compute_hash()),
            "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
        );
    }

    #[test]
    fn test_trailing_field_gap_is_rejected() {
        let mut value = genesis_json();
        value["withdrawalsRoot"] = json!(format!("0x{}", "11".repeat(32)));
        match BlockHeader::from_json(&value) {
            Err(HeaderError::InvalidField { field, .. }) => assert_eq!(field, "withdrawalsRoot"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_fixed_width_fields_are_checked() {
        let mut value = genesis_json();
        value["miner"] = json!("0x00");
        match BlockHeader::from_json(&value) {
            Err(HeaderError::InvalidField { field, .. }) => assert_eq!(field, "miner"),
            other => panic!("unexpected result: {:?}", other),
        }

        let mut value = genesis_json();
        value["stateRoot"] = json!(42);
        assert!(matches!(
            BlockHeader::from_json(&value),
            Err(HeaderError::InvalidField { field: "stateRoot", .. })
        ));
    }

    #[test]
    fn test_missing_field() {
        let mut value = genesis_json();
        value.as_object_mut().unwrap().remove("mixHash");
        assert!(matches!(
            BlockHeader::from_json(&value),
            Err(HeaderError::Json(_))
        ));
    }
}
