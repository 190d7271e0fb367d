use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?}, expected text, json or journald")]
    InvalidFormat(String),
    #[error("journald output needs linux and the `journald` feature")]
    JournaldNotSupported,
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("journald socket unavailable: {0}")]
    Journald(String),
    #[error("bad log filter {directive:?}: {reason}")]
    InvalidFilter { directive: String, reason: String },
}
