use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use super::cookie;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id sent by the client, if it is a UUID; anything else is replaced.
fn client_request_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// Run each request inside an `http_request` span and echo its id back.
///
/// Completion is logged at `warn` for server errors so classifier failures
/// stand out, `info` otherwise.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let request_id = client_request_id(request.headers()).unwrap_or_else(Uuid::new_v4);
    let known_session = cookie::session_from_headers(request.headers()).is_some();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        known_session,
    );
    let started_at = Instant::now();

    let mut response = next.run(request).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(parent: &span, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(parent: &span, status = status.as_u16(), elapsed_ms, "request completed");
    }

    response
}
