//! API routes.

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Request};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers::{health, segment_image};
use super::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .route("/api/segment", post(segment_image))
        .route("/health", get(health))
        // Enforced while the multipart body is read, so oversize uploads
        // surface as `ApiError::PayloadTooLarge`
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
