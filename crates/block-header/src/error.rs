use ethereum_types::H256;
use thiserror::Error;

/// Errors raised while rebuilding or authenticating a block header.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// A header field could not be turned into its canonical byte form.
    #[error("Invalid header field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The header JSON is missing a required field or has the wrong shape.
    #[error("Header JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The recomputed header hash differs from the hash the endpoint reported.
    #[error("Block hash mismatch: endpoint reported {claimed:?}, header encodes to {computed:?}")]
    IntegrityMismatch { claimed: H256, computed: H256 },
}

impl HeaderError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl ToString) -> Self {
        HeaderError::InvalidField {
            field,
            reason: reason.to_string(),
        }
    }
}
