use block_header::hex::decode_hex;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// One RLP item from a proof path, kept structurally and never interpreted
/// as a branch, extension or leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrieNode {
    Bytes(Vec<u8>),
    List(Vec<TrieNode>),
}

impl Encodable for TrieNode {
    fn rlp_append(&self, stream: &mut RlpStream) {
        match self {
            TrieNode::Bytes(bytes) => {
                stream.encoder().encode_value(bytes);
            }
            TrieNode::List(items) => {
                stream.begin_list(items.len());
                for item in items {
                    stream.append(item);
                }
            }
        }
    }
}

/// Deepest list nesting accepted inside one node. Branch, extension and leaf
/// nodes nest at most two levels.
pub const MAX_NODE_DEPTH: usize = 16;

impl Decodable for TrieNode {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        decode_nested(rlp, 0)
    }
}

fn decode_nested(rlp: &Rlp, depth: usize) -> Result<TrieNode, DecoderError> {
    if !rlp.is_list() {
        return Ok(TrieNode::Bytes(rlp.data()?.to_vec()));
    }
    if depth >= MAX_NODE_DEPTH {
        return Err(DecoderError::Custom("node nesting too deep"));
    }
    let count = rlp.item_count()?;
    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        items.push(decode_nested(&rlp.at(i)?, depth + 1)?);
    }
    Ok(TrieNode::List(items))
}

/// Decodes one serialized node, accepting only input that re-encodes to
/// exactly the same bytes. Trailing bytes and non-canonical length prefixes
/// are rejected.
pub fn decode_node(bytes: &[u8]) -> Result<TrieNode, DecoderError> {
    let node = TrieNode::decode(&Rlp::new(bytes))?;
    if rlp::encode(&node).as_ref() != bytes {
        return Err(DecoderError::Custom("node is not in canonical form"));
    }
    Ok(node)
}

/// A node that failed to decode, by position in its proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDecodeError {
    pub index: usize,
    pub reason: String,
}

/// Decodes a hex-encoded proof path, preserving root-to-leaf order.
pub fn decode_proof_nodes(nodes: &[String]) -> Result<Vec<TrieNode>, NodeDecodeError> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let bytes = decode_hex(node).map_err(|e| NodeDecodeError {
                index,
                reason: e.to_string(),
            })?;
            decode_node(&bytes).map_err(|e| NodeDecodeError {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
