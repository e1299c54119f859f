//! HTTP surface for the portal.
//!
//! Every endpoint answers with the [`ApiResponse`] envelope. CORS is applied
//! by the binary so tests can drive the bare router.

pub mod envelope;
pub mod erm_routes;
pub mod navigation_routes;
pub mod request_log;
pub mod state;
pub mod system_routes;

use axum::{middleware as axum_mw, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use envelope::{ApiError, ApiResponse};
pub use request_log::{ApiRequestLog, ProcedureName, RequestLog, REQUEST_LOG_CAPACITY};
pub use state::AppState;

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // ERM grid
        .route("/api/erm", get(erm_routes::get_erm))
        .route("/api/erm/forms", get(erm_routes::list_erm_forms))
        // Navigation
        .route("/api/navigation", get(navigation_routes::get_navigation))
        .route(
            "/api/navigation/tree",
            get(navigation_routes::get_navigation_tree),
        )
        .route(
            "/api/navigation/modules/:obj_no/children",
            get(navigation_routes::get_module_children),
        )
        // Diagnostics
        .route("/health", get(system_routes::health))
        .route(
            "/api/logs",
            get(system_routes::list_logs).delete(system_routes::clear_logs),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_mw::from_fn_with_state(
                    state.request_log.clone(),
                    request_log::record_request,
                )),
        )
        .with_state(state)
}
