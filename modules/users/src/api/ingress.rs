//! Top-level HTTP router: service endpoints, health, OpenAPI and the
//! middleware stack shared by all of them.

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::get,
    BoxError, Router,
};
use serde_json::{json, Value};
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};
use tracing::{error, warn};
use utoipa::OpenApi;

use crate::api::request_id;
use crate::api::rest::error::ErrorBody;
use crate::api::rest::openapi::ApiDoc;
use crate::module::UsersModuleConfig;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn openapi_json() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Json(ApiDoc::openapi()))
}

fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<ErrorBody>) {
    (status, Json(ErrorBody::new(status, message)))
}

async fn route_not_found(method: Method, uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    error_response(
        StatusCode::NOT_FOUND,
        format!("No route for {method} {}", uri.path()),
    )
}

async fn method_not_allowed(method: Method, uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {method} is not allowed on {}", uri.path()),
    )
}

/// Errors raised by the timeout middleware, rendered in the usual envelope.
async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorBody>) {
    if err.is::<Elapsed>() {
        warn!("Request timed out");
        return error_response(StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string());
    }
    error!(error = %err, "Unhandled middleware error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("An unexpected error occurred: {err}"),
    )
}

/// Wrap `routes` with the health/OpenAPI endpoints, the fallbacks and the
/// middleware stack.
pub fn build_router(routes: Router, cfg: &UsersModuleConfig) -> Router {
    let mut router = routes
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_json))
        // applies to the routes registered above, so it goes last
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found);

    // Layers added later wrap the earlier ones. Resulting order, outermost first:
    // SetRequestId -> PropagateRequestId -> Trace -> Timeout -> CORS -> BodyLimit
    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));

    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    if cfg.timeout_sec > 0 {
        router = router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(cfg.timeout_sec))),
        );
    }

    router = router.layer(request_id::create_trace_layer());

    let x_request_id = request_id::header();
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

    router
}
