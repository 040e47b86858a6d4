//! Middleware that rejects requests before they reach a route handler.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, endpoints, rate_limit::RateLimiter};

/// The key used for clients that do not identify themselves.
const UNKNOWN_CLIENT: &str = "unknown";

/// Reject API requests with a body that is not declared as JSON.
///
/// Only POST, PUT and PATCH requests under `/api` are checked.
pub async fn require_json_content_type(request: Request, next: Next) -> Response {
    let has_body = matches!(*request.method(), Method::POST | Method::PUT | Method::PATCH);

    if has_body && is_api_path(request.uri().path()) && !has_json_content_type(request.headers()) {
        tracing::debug!(
            "Rejected {} {} without a JSON content type",
            request.method(),
            request.uri()
        );
        return Error::UnsupportedContentType.into_response();
    }

    next.run(request).await
}

/// Reject requests from clients that have used up their allowance.
///
/// The health check is never limited.
pub async fn rate_limit(
    State(rate_limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() != endpoints::HEALTH {
        let client = client_key(request.headers());

        if let Err(error) = rate_limiter.check(&client) {
            tracing::warn!("Rate limited client {client}");
            return error.into_response();
        }
    }

    next.run(request).await
}

fn is_api_path(path: &str) -> bool {
    path == endpoints::API_PREFIX
        || path
            .strip_prefix(endpoints::API_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

/// Identify the client by the first `x-forwarded-for` entry, then `x-real-ip`.
fn client_key(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|client| !client.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_owned()
}
