use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Failure to obtain a payload from the CI server.
///
/// Every variant is recoverable: the poller shows it and retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected http status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
