pub mod annotation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /annotation/hit-test                 pointer hit-test + overlay (POST)
/// /annotation/overlay                  overlay for queue/hover state (POST)
/// /annotation/instances/disable        disable / re-enable regions (POST)
/// /annotation/instances/disabled       list (GET), clear (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/annotation", annotation::router())
}
