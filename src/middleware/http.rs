//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Panic recovery (outermost, so a panic in any inner layer, including the
//!   access middleware, becomes a 500 instead of a dropped connection)
//! - Request-Id generation + propagation (X-Request-Id)
//! - Access logging / request tracing (TraceLayer)
//! - Body size limits
//! - Per-request deadline
//!
//! Request flow: catch-panic → request-id → trace → limit → timeout → router
//! (→ access middleware → handler).

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, header::HeaderName};
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Apply HTTP-level middleware to the given Router.
///
/// Defaults:
/// - Request-Id header: `x-request-id`
/// - Body limit: 1 MiB
pub fn apply(router: Router, request_timeout: Duration) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        .layer(CatchPanicLayer::custom(handle_panic))
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(handle_layer_error))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        // Access log / tracing for all requests.
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        // Dropping the inner future aborts any in-flight query.
        .layer(TimeoutLayer::new(request_timeout));

    router.layer(layers)
}

fn make_request_span(req: &Request<Body>) -> tracing::Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    )
}

async fn handle_layer_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request deadline exceeded");
        AppError::DeadlineExceeded
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        AppError::Internal
    }
}

// The payload and location are already logged by the process panic hook.
fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::debug!("recovered from panic");
    AppError::Internal.into_response()
}
