use block_header::HeaderError;
use ethereum_types::H256;
use thiserror::Error;

/// Failure reaching the JSON-RPC endpoint or reading its response envelope.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("`{method}` returned no result")]
    MissingResult { method: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> RpcError {
        RpcError::InvalidResponse(err.to_string())
    }
}

/// Coarse classification of a [`ProofError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The endpoint could not be reached or answered with an error.
    Transport,
    /// The header the endpoint served cannot be authenticated.
    HeaderIntegrity,
    /// A proof request for one of the targets failed.
    ProofFetch,
    /// A proof node is not well-formed RLP.
    MalformedProofNode,
    /// The caller's request was rejected before any network call.
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum ProofError {
    #[error("Transport error: {0}")]
    Transport(#[from] RpcError),
    #[error("Block hash mismatch: endpoint reported {claimed:?}, header encodes to {computed:?}")]
    HeaderIntegrity { claimed: H256, computed: H256 },
    #[error("Invalid block header: {0}")]
    InvalidHeader(#[source] HeaderError),
    #[error("Proof fetch failed for {address}: {source}")]
    ProofFetch {
        address: String,
        #[source]
        source: RpcError,
    },
    #[error("Malformed node {index} in {proof} proof of {address}: {reason}")]
    MalformedProofNode {
        address: String,
        proof: String,
        index: usize,
        reason: String,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProofError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProofError::Transport(_) => ErrorKind::Transport,
            ProofError::HeaderIntegrity { .. } | ProofError::InvalidHeader(_) => {
                ErrorKind::HeaderIntegrity
            }
            ProofError::ProofFetch { .. } => ErrorKind::ProofFetch,
            ProofError::MalformedProofNode { .. } => ErrorKind::MalformedProofNode,
            ProofError::InvalidRequest(_) => ErrorKind::InvalidInput,
        }
    }
}

impl From<HeaderError> for ProofError {
    fn from(err: HeaderError) -> ProofError {
        match err {
            HeaderError::IntegrityMismatch { claimed, computed } => {
                ProofError::HeaderIntegrity { claimed, computed }
            }
            other => ProofError::InvalidHeader(other),
        }
    }
}

/// Errors raised while reading or writing fixture directories.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected fixture path: {0}")]
    InvalidPath(String),
    #[error("Missing fixture: {0}")]
    Missing(String),
    #[error(transparent)]
    Proof(#[from] ProofError),
}
