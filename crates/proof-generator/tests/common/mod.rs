#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use proof_generator::{BlockSelector, EthRpc, FixtureStore, RpcError};
use serde_json::Value;

pub const HOLDER_A: &str = "0x7a16ff8270133f063aab6c9977183d9e72835428";
pub const HOLDER_B: &str = "0xf89501b77b2fa6329f94f5a05fe84cebb5c8b1a0";

pub const BLOCK_B0FA43: u64 = 11_598_403;
pub const BLOCK_LONDON: u64 = 14_297_900;
pub const BLOCK_CANCUN: u64 = 19_500_000;

pub fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

pub fn load_fixtures() -> FixtureStore {
    FixtureStore::load_dir(&data_dir()).unwrap()
}

/// Slots recorded in the fixture proofs of each holder.
pub fn fixture_target(holder: &str) -> String {
    match holder {
        HOLDER_A => format!("{}:0x0,0x2", HOLDER_A),
        HOLDER_B => format!("{}:0x5", HOLDER_B),
        other => panic!("no fixture for {}", other),
    }
}

/// An [`EthRpc`] answering from a [`FixtureStore`], with per-address delays
/// and injected failures.
pub struct FixtureRpc {
    store: FixtureStore,
    latest: u64,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    proof_calls: AtomicUsize,
    proof_blocks: Mutex<Vec<BlockSelector>>,
}

impl FixtureRpc {
    pub fn new(store: FixtureStore, latest: u64) -> Self {
        Self {
            store,
            latest,
            delays: HashMap::new(),
            failing: HashSet::new(),
            proof_calls: AtomicUsize::new(0),
            proof_blocks: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    pub fn failing(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    pub fn proof_calls(&self) -> usize {
        self.proof_calls.load(Ordering::SeqCst)
    }

    pub fn proof_blocks(&self) -> Vec<BlockSelector> {
        self.proof_blocks.lock().unwrap().clone()
    }
}

#[async_trait]
impl EthRpc for FixtureRpc {
    async fn get_block_by_number(&self, block: &BlockSelector) -> Result<Value, RpcError> {
        let number = match block {
            BlockSelector::Latest => self.latest,
            BlockSelector::Earliest => 0,
            BlockSelector::Number(number) => *number,
        };
        self.store
            .block(number)
            .cloned()
            .ok_or_else(|| RpcError::MissingResult {
                method: "eth_getBlockByNumber".to_string(),
            })
    }

    async fn get_proof(
        &self,
        address: &str,
        _storage_keys: &[String],
        block: &BlockSelector,
    ) -> Result<Value, RpcError> {
        self.proof_calls.fetch_add(1, Ordering::SeqCst);
        self.proof_blocks.lock().unwrap().push(*block);

        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(address) {
            return Err(RpcError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            });
        }

        let number = match block {
            BlockSelector::Number(number) => *number,
            other => panic!("proof requested at unpinned block {}", other),
        };
        self.store
            .proofs(number, address)
            .cloned()
            .ok_or_else(|| RpcError::MissingResult {
                method: "eth_getProof".to_string(),
            })
    }
}

/// Flips the lowest bit of the last hex digit.
pub fn flip_last_bit(value: &str) -> String {
    let mut digits: Vec<char> = value.chars().collect();
    let last = digits.len() - 1;
    let nibble = digits[last].to_digit(16).unwrap() ^ 1;
    digits[last] = std::char::from_digit(nibble, 16).unwrap();
    digits.into_iter().collect()
}
