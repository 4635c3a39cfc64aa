use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport settings for [`crate::rpc::HttpRpcClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcConfig {
    pub url: String,
    /// Upper bound for a single JSON-RPC round trip.
    pub request_timeout: Duration,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
