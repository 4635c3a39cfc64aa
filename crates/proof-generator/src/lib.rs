//! # Proof Generator
//!
//! Fetches account and storage proofs for a verified Ethereum block header
//! and serializes them into the two blobs a trie verifier consumes: the
//! header RLP and the proof section.
//!
//! ## Modules
//!
//! - `rpc`: the [`EthRpc`] capability and its HTTP implementation.
//! - `service`: proof fetching, trie node decoding and bundle encoding.
//! - `pipeline`: [`ProofPipeline`], which gates every proof request on the
//!   header check.
//! - `fixtures`: keyed store of recorded responses for tests.
//! - `model`: request/response types, targets and errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use proof_generator::{HttpRpcClient, ProofPipeline, ProofRequest, ProofTarget, RpcConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let rpc = HttpRpcClient::new(&RpcConfig::new("http://localhost:8545"))?;
//! let target: ProofTarget = "0x6b175474e89094c44da98b954eedeac495271d0f:0x2".parse()?;
//! let request = ProofRequest::new("latest".parse()?, vec![target]);
//!
//! let encoded = ProofPipeline::new(rpc).run(&request).await?;
//! println!("{}\n{}", encoded.header_hex(), encoded.proofs_hex());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod fixtures;
pub mod model;
pub mod pipeline;
pub mod rpc;
pub mod service;

pub use config::RpcConfig;
pub use fixtures::FixtureStore;
pub use model::errors::{ErrorKind, FixtureError, ProofError, RpcError};
pub use model::eth_rpc::BlockSelector;
pub use model::target::{ProofTarget, SlotKey};
pub use pipeline::{PipelineError, PipelineStage, ProofPipeline, ProofRequest};
pub use rpc::{EthRpc, HttpRpcClient};
pub use service::bundle::{EncodedBundle, ProofBundle, ProofGroup, ProofLayout};
pub use service::trie_node::TrieNode;
