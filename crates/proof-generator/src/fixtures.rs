//! Recorded RPC responses for tests.
//!
//! On disk a store is a directory of `block_<n>/block.json` files, each next
//! to one `proofs_<holder>.json` per recorded account. Nothing is cached
//! between stores; every test builds or loads its own.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use block_header::{verify_header_json, VerifiedHeader};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::model::errors::{FixtureError, ProofError};
use crate::model::eth_rpc::BlockSelector;
use crate::model::target::{normalize_address, ProofTarget};
use crate::rpc::EthRpc;
use crate::service::bundle::{encode_proof_section, ProofGroup, ProofLayout};
use crate::service::fetch_proof::parse_proof_response;

const BLOCK_DIR_PREFIX: &str = "block_";
const BLOCK_FILE: &str = "block.json";
const PROOFS_FILE_PREFIX: &str = "proofs_";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FixtureStore {
    blocks: BTreeMap<u64, Value>,
    proofs: BTreeMap<(u64, String), Value>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_block(&mut self, number: u64, block: Value) {
        self.blocks.insert(number, block);
    }

    pub fn insert_proofs(
        &mut self,
        number: u64,
        holder: &str,
        proofs: Value,
    ) -> Result<(), FixtureError> {
        let holder = normalize_address(holder)?;
        self.proofs.insert((number, holder), proofs);
        Ok(())
    }

    pub fn block(&self, number: u64) -> Option<&Value> {
        self.blocks.get(&number)
    }

    pub fn proofs(&self, number: u64, holder: &str) -> Option<&Value> {
        let holder = normalize_address(holder).ok()?;
        self.proofs.get(&(number, holder))
    }

    pub fn block_numbers(&self) -> impl Iterator<Item = u64> + '_ {
        self.blocks.keys().copied()
    }

    /// Holders recorded at `number`, in address order.
    pub fn holders(&self, number: u64) -> impl Iterator<Item = &str> + '_ {
        self.proofs
            .keys()
            .filter(move |(block, _)| *block == number)
            .map(|(_, holder)| holder.as_str())
    }

    /// The verified header of a recorded block.
    pub fn serialized_block(&self, number: u64) -> Result<VerifiedHeader, FixtureError> {
        let block = self
            .block(number)
            .ok_or_else(|| FixtureError::Missing(format!("block {}", number)))?;
        Ok(verify_header_json(block).map_err(ProofError::from)?)
    }

    /// The proof section for a single recorded holder.
    pub fn serialized_proofs(
        &self,
        number: u64,
        holder: &str,
        layout: ProofLayout,
    ) -> Result<Vec<u8>, FixtureError> {
        let proofs = self
            .proofs(number, holder)
            .ok_or_else(|| FixtureError::Missing(format!("proofs of {} at {}", holder, number)))?;
        let holder = normalize_address(holder)?;
        let raw = parse_proof_response(&holder, proofs.clone(), None)?;
        let group = ProofGroup::decode(raw)?;
        Ok(encode_proof_section(&[group], layout))
    }

    /// Fetches a block and the proofs of `targets` at that block, and adds
    /// them to the store. Returns the recorded block number.
    ///
    /// The store is only changed once every response has arrived and the
    /// header has been verified.
    #[instrument(skip(self, rpc, targets), fields(targets = targets.len()))]
    pub async fn record<R: EthRpc + ?Sized>(
        &mut self,
        rpc: &R,
        block: BlockSelector,
        targets: &[ProofTarget],
    ) -> Result<u64, FixtureError> {
        let block_json = rpc
            .get_block_by_number(&block)
            .await
            .map_err(ProofError::from)?;
        let number = verify_header_json(&block_json)
            .map_err(ProofError::from)?
            .number();

        let mut recorded = Vec::with_capacity(targets.len());
        for target in targets {
            let proofs = rpc
                .get_proof(
                    target.address(),
                    &target.storage_keys(),
                    &BlockSelector::Number(number),
                )
                .await
                .map_err(|source| ProofError::ProofFetch {
                    address: target.address().to_string(),
                    source,
                })?;
            recorded.push(((number, target.address().to_string()), proofs));
        }
        self.proofs.extend(recorded);
        self.blocks.insert(number, block_json);
        debug!(number, "Recorded fixtures");
        Ok(number)
    }

    pub fn load_dir(dir: &Path) -> Result<Self, FixtureError> {
        let mut store = FixtureStore::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let name = file_name(&path)?;
            let Some(number) = name.strip_prefix(BLOCK_DIR_PREFIX) else {
                continue;
            };
            let number: u64 = number
                .parse()
                .map_err(|_| FixtureError::InvalidPath(path.display().to_string()))?;

            let block = fs::read_to_string(path.join(BLOCK_FILE))?;
            store.insert_block(number, serde_json::from_str(&block)?);

            for file in fs::read_dir(&path)? {
                let file = file?.path();
                let name = file_name(&file)?;
                let Some(holder) = name
                    .strip_prefix(PROOFS_FILE_PREFIX)
                    .and_then(|rest| rest.strip_suffix(".json"))
                else {
                    continue;
                };
                let proofs = fs::read_to_string(&file)?;
                store.insert_proofs(number, holder, serde_json::from_str(&proofs)?)?;
            }
        }
        Ok(store)
    }

    pub fn save_dir(&self, dir: &Path) -> Result<(), FixtureError> {
        for (number, block) in &self.blocks {
            let block_dir = dir.join(format!("{}{}", BLOCK_DIR_PREFIX, number));
            fs::create_dir_all(&block_dir)?;
            fs::write(
                block_dir.join(BLOCK_FILE),
                serde_json::to_string_pretty(block)?,
            )?;
        }
        for ((number, holder), proofs) in &self.proofs {
            let block_dir = dir.join(format!("{}{}", BLOCK_DIR_PREFIX, number));
            fs::create_dir_all(&block_dir)?;
            fs::write(
                block_dir.join(format!("{}{}.json", PROOFS_FILE_PREFIX, holder)),
                serde_json::to_string_pretty(proofs)?,
            )?;
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> Result<&str, FixtureError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| FixtureError::InvalidPath(path.display().to_string()))
}
