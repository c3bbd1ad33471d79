//! Route definitions for annotation hit-testing and overlays.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

/// Annotation routes, nested under `/annotation`.
///
/// ```text
/// POST   /hit-test                   hit_test
/// POST   /overlay                    render_overlay
/// POST   /instances/disable          set_disabled
/// GET    /instances/disabled         list_disabled
/// DELETE /instances/disabled         clear_disabled
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hit-test", post(annotation::hit_test))
        .route("/overlay", post(annotation::render_overlay))
        .route("/instances/disable", post(annotation::set_disabled))
        .route(
            "/instances/disabled",
            get(annotation::list_disabled).delete(annotation::clear_disabled),
        )
}
