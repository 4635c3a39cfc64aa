use std::fmt;
use std::str::FromStr;

use block_header::hex::to_0x_string;
use block_header::VerifiedHeader;
use rlp::RlpStream;

use super::fetch_proof::RawProof;
use super::trie_node::{decode_proof_nodes, NodeDecodeError, TrieNode};
use crate::model::errors::ProofError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountProof {
    pub address: String,
    pub nodes: Vec<TrieNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageProof {
    pub key: String,
    pub nodes: Vec<TrieNode>,
}

/// The decoded proofs of one target: its account proof and one storage
/// proof per requested slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofGroup {
    pub account: AccountProof,
    pub storage: Vec<StorageProof>,
}

impl ProofGroup {
    pub fn decode(raw: RawProof) -> Result<Self, ProofError> {
        let malformed = |proof: String, err: NodeDecodeError| ProofError::MalformedProofNode {
            address: raw.address.clone(),
            proof,
            index: err.index,
            reason: err.reason,
        };

        let account_nodes = decode_proof_nodes(&raw.account_proof)
            .map_err(|e| malformed("account".to_string(), e))?;

        let storage = raw
            .storage_proofs
            .iter()
            .enumerate()
            .map(|(i, storage)| {
                decode_proof_nodes(&storage.proof)
                    .map(|nodes| StorageProof {
                        key: storage.key.clone(),
                        nodes,
                    })
                    .map_err(|e| malformed(format!("storage[{}]", i), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProofGroup {
            account: AccountProof {
                address: raw.address.clone(),
                nodes: account_nodes,
            },
            storage,
        })
    }
}

/// How proof groups are arranged inside the proof-section list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProofLayout {
    /// Per target `[account], [[storage]...]`.
    #[default]
    Grouped,
    /// Per target `[account], [storage], [storage]...`.
    Flat,
    /// Every account proof, then every storage proof.
    AccountsFirst,
}

impl FromStr for ProofLayout {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grouped" => Ok(ProofLayout::Grouped),
            "flat" => Ok(ProofLayout::Flat),
            "accounts-first" => Ok(ProofLayout::AccountsFirst),
            other => Err(ProofError::InvalidRequest(format!(
                "unknown proof layout `{}`",
                other
            ))),
        }
    }
}

impl fmt::Display for ProofLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProofLayout::Grouped => "grouped",
            ProofLayout::Flat => "flat",
            ProofLayout::AccountsFirst => "accounts-first",
        };
        f.write_str(name)
    }
}

fn append_nodes(stream: &mut RlpStream, nodes: &[TrieNode]) {
    stream.begin_list(nodes.len());
    for node in nodes {
        stream.append(node);
    }
}

/// Encodes the proof section as one RLP list. Node order inside each proof
/// and group order are kept as given.
pub fn encode_proof_section(groups: &[ProofGroup], layout: ProofLayout) -> Vec<u8> {
    let mut stream = RlpStream::new();
    match layout {
        ProofLayout::Grouped => {
            stream.begin_list(groups.len() * 2);
            for group in groups {
                append_nodes(&mut stream, &group.account.nodes);
                stream.begin_list(group.storage.len());
                for storage in &group.storage {
                    append_nodes(&mut stream, &storage.nodes);
                }
            }
        }
        ProofLayout::Flat => {
            let len = groups.iter().map(|g| 1 + g.storage.len()).sum();
            stream.begin_list(len);
            for group in groups {
                append_nodes(&mut stream, &group.account.nodes);
                for storage in &group.storage {
                    append_nodes(&mut stream, &storage.nodes);
                }
            }
        }
        ProofLayout::AccountsFirst => {
            let len = groups.iter().map(|g| 1 + g.storage.len()).sum();
            stream.begin_list(len);
            for group in groups {
                append_nodes(&mut stream, &group.account.nodes);
            }
            for storage in groups.iter().flat_map(|g| &g.storage) {
                append_nodes(&mut stream, &storage.nodes);
            }
        }
    }
    stream.out().to_vec()
}

/// A verified header with one decoded proof group per requested target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofBundle {
    header: VerifiedHeader,
    groups: Vec<ProofGroup>,
}

impl ProofBundle {
    pub fn new(header: VerifiedHeader, groups: Vec<ProofGroup>) -> Self {
        Self { header, groups }
    }

    pub fn header(&self) -> &VerifiedHeader {
        &self.header
    }

    pub fn groups(&self) -> &[ProofGroup] {
        &self.groups
    }

    pub fn encode(self, layout: ProofLayout) -> EncodedBundle {
        let header = self.header.rlp_bytes().to_vec();
        let proofs = encode_proof_section(&self.groups, layout);
        EncodedBundle {
            bundle: self,
            layout,
            header,
            proofs,
        }
    }
}

/// The two output blobs, kept apart: the header encoding and the proof
/// section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBundle {
    pub bundle: ProofBundle,
    pub layout: ProofLayout,
    pub header: Vec<u8>,
    pub proofs: Vec<u8>,
}

impl EncodedBundle {
    pub fn block_number(&self) -> u64 {
        self.bundle.header.number()
    }

    pub fn header_hex(&self) -> String {
        to_0x_string(&self.header)
    }

    pub fn proofs_hex(&self) -> String {
        to_0x_string(&self.proofs)
    }
}
