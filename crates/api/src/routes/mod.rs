pub mod auth;
pub mod candidates;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                 login (public)
/// /auth/refresh               refresh (public)
/// /auth/logout                logout (requires auth)
///
/// /candidates/upload          roster upload (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/candidates", candidates::router())
}
