//! Request tracing layer

use axum::Router;
use http::{header, Request};
use std::time::Duration;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{info_span, Span};
use uuid::Uuid;

/// Wraps every route in a `depot_request` span and logs the response status
/// at a level matching its class.
pub fn with_request_tracing<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                info_span!(
                    "depot_request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            })
            .on_request(|request: &Request<_>, _span: &Span| {
                let content_length = request
                    .headers()
                    .get(header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::debug!(content_length = %content_length, "request received");
            })
            .on_response(|response: &http::Response<_>, latency: Duration, _span: &Span| {
                let status = response.status();
                let latency_ms = latency.as_millis();

                if status.is_success() {
                    tracing::info!(status = status.as_u16(), latency_ms = latency_ms, "request completed");
                } else if status.is_client_error() {
                    tracing::warn!(status = status.as_u16(), latency_ms = latency_ms, "client error response");
                } else {
                    tracing::error!(status = status.as_u16(), latency_ms = latency_ms, "server error response");
                }
            })
            .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                tracing::error!(latency_ms = latency.as_millis(), error = ?error, "request failed");
            }),
    )
}
