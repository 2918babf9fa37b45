//! Route definitions for the `/candidates` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::candidates;
use crate::state::AppState;

/// Routes mounted at `/candidates`.
///
/// ```text
/// POST /upload   -> roster upload (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(candidates::upload_roster))
}
