//! Early rejection of request bodies larger than the configured limit

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use crate::error::AppError;

/// Limit, in bytes, shared with the body-limit middleware.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimit(pub u64);

/// Answers 413 before the handler runs when the declared `Content-Length`
/// exceeds the limit. Bodies without a declared length are capped while
/// streaming by axum's `DefaultBodyLimit`.
pub async fn body_limit_middleware(
    State(BodyLimit(limit)): State<BodyLimit>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Infallible> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    if let Some(length) = declared {
        if length > limit {
            tracing::warn!(
                path = %request.uri().path(),
                content_length = length,
                limit = limit,
                "rejecting oversized request body"
            );
            return Ok(AppError::PayloadTooLarge { limit }.into_response());
        }
    }

    Ok(next.run(request).await)
}

pub async fn security_headers_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, Infallible> {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, header::HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, header::HeaderValue::from_static("DENY"));

    Ok(response)
}
