use thiserror::Error;

/// Shape mismatch between an upstream payload and the model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid payload: {0}")]
    Decode(String),
}
