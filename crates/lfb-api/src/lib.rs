mod error;
pub use error::ApiError;

mod board;
pub use board::{BoardSnapshot, CellView, HeadingView, RowView, StatusBoard};

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

#[cfg(feature = "http")]
pub use axum;
