use axum::{
    Json, Router,
    extract::{Path, State},
    response::{Html, IntoResponse},
    routing::get,
};
use lfb_model::Target;
use tracing::debug;

use crate::{board::StatusBoard, error::ApiError};

/// Seconds between browser reloads of the page.
const PAGE_REFRESH_SECS: u32 = 15;

/// HTTP API service builder.
pub struct HttpApi {
    board: StatusBoard,
}

impl HttpApi {
    pub fn new(board: StatusBoard) -> Self {
        Self { board }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET / - Status page
    /// - GET /api/v1/board - Whole grid as JSON
    /// - GET /api/v1/board/:target - One cell
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(page))
            .route("/api/v1/board", get(board))
            .route("/api/v1/board/{target}", get(cell))
            .with_state(self.board)
    }
}

/// GET /
async fn page(State(board): State<StatusBoard>) -> Result<Html<String>, ApiError> {
    Ok(Html(board.page(PAGE_REFRESH_SECS)?))
}

/// GET /api/v1/board
async fn board(State(board): State<StatusBoard>) -> impl IntoResponse {
    Json(board.snapshot())
}

/// GET /api/v1/board/:target
async fn cell(
    State(board): State<StatusBoard>,
    Path(target): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if target.trim().is_empty() {
        return Err(ApiError::InvalidRequest("target cannot be empty".into()));
    }
    let target = Target::from(target);
    debug!(%target, "getting cell");

    board
        .cell(&target)
        .map(Json)
        .ok_or_else(|| ApiError::CellNotFound(target.to_string()))
}
