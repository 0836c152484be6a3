pub mod admit;
pub mod health;

pub use admit::*;
pub use health::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit();

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        // Uploads are size-checked while streaming, so the rejection carries
        // its admission reason instead of a transport error.
        .route(
            "/api/v1/admit",
            post(admit_handler).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/v1/classify", post(classify_handler))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
