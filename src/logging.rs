//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// The header set by the request ID layer in the server binary.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The number of characters of a body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Lines are prefixed with the request ID so that a request and its response
/// can be matched up. Bodies longer than [LOG_BODY_LENGTH_LIMIT] characters
/// are truncated at the `info` level and logged in full at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = get_request_id(request.headers());

    let (parts, body) = request.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::error!("[{request_id}] Could not read request body: {error}");
            return Error::InvalidJson("could not read request body".to_owned()).into_response();
        }
    };

    tracing::info!("[{request_id}] {} {}", parts.method, parts.uri);
    log_body(&request_id, "Request", &body_text);

    let response = next.run(Request::from_parts(parts, body_text.into())).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::error!("[{request_id}] Could not read response body: {error}");
            return Error::Internal(error.to_string()).into_response();
        }
    };

    tracing::info!("[{request_id}] Response: {}", parts.status);
    log_body(&request_id, "Response", &body_text);

    Response::from_parts(parts, body_text.into())
}

fn get_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_owned()
}

async fn read_body_text(body: Body) -> Result<String, axum::Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_body(request_id: &str, label: &str, body: &str) {
    if body.is_empty() {
        return;
    }

    match truncate(body, LOG_BODY_LENGTH_LIMIT) {
        Some(truncated) => {
            tracing::info!("[{request_id}] {label} body: {truncated}...");
            tracing::debug!("[{request_id}] Full {label} body: {body:?}");
        }
        None => tracing::info!("[{request_id}] {label} body: {body}"),
    }
}

/// The first `limit` characters of `text`, or `None` if `text` is not longer.
fn truncate(text: &str, limit: usize) -> Option<&str> {
    text.char_indices().nth(limit).map(|(end, _)| &text[..end])
}
