//! Handler that answers with a description of the request it received.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use callcheck_domain::{CapturedRequest, HeaderSet};
use callcheck_domain::request::JSON_MEDIA_TYPE;

/// Echo handler answering `200 OK` with a JSON [`CapturedRequest`].
#[must_use]
pub fn echo_router() -> Router {
    echo_router_with(StatusCode::OK, JSON_MEDIA_TYPE)
}

/// Echo handler answering with `status` and the given `Content-Type`.
#[must_use]
pub fn echo_router_with(status: StatusCode, content_type: &'static str) -> Router {
    Router::new().fallback(move |request: Request| echo(request, status, content_type))
}

/// Turns a received request into a [`CapturedRequest`].
///
/// # Errors
///
/// Returns the body error message if the body cannot be read.
pub async fn capture(request: Request) -> Result<CapturedRequest, String> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.map_err(|e| e.to_string())?;

    let headers: HeaderSet = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let url = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.to_string(), ToString::to_string);

    Ok(CapturedRequest::from_parts(
        parts.method.as_str(),
        url,
        headers,
        &body,
    ))
}

async fn echo(request: Request, status: StatusCode, content_type: &'static str) -> Response {
    let captured = match capture(request).await {
        Ok(captured) => captured,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    match serde_json::to_vec(&captured) {
        Ok(body) => (status, [(header::CONTENT_TYPE, content_type)], Body::from(body)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
