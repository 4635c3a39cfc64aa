//! # Block Header
//!
//! Rebuilds Ethereum block headers from loosely typed JSON-RPC responses into
//! their canonical RLP encoding, and authenticates them by recomputing the
//! Keccak-256 header hash.
//!
//! ## Modules
//!
//! - `hex`: the [`HexQuantity`] value type and hex helpers.
//! - `block_header`: canonical header fields, RLP encoding and hashing.
//! - `verify`: the hash check producing a [`VerifiedHeader`].
//! - `constants`: mainnet fork boundaries and header shapes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use block_header::verify_header_json;
//!
//! # fn run(result: serde_json::Value) -> Result<(), block_header::HeaderError> {
//! let verified = verify_header_json(&result)?;
//! println!("block {} hash {:?}", verified.number(), verified.hash());
//! # Ok(())
//! # }
//! ```

pub mod block_header;
pub mod constants;
pub mod error;
pub mod hex;
pub mod verify;

pub use block_header::{keccak256, BlockHeader, RpcBlockHeader};
pub use error::HeaderError;
pub use hex::HexQuantity;
pub use verify::{verify_header, verify_header_json, VerifiedHeader};
