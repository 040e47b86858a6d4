//! The fallback handler for unknown routes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// A route handler for requests that match no route.
pub async fn get_404_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode};
    use axum_test::TestServer;
    use serde_json::json;

    use super::get_404_not_found;

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = TestServer::new(Router::new().fallback(get_404_not_found))
            .expect("Could not create test server.");

        let response = server.get("/does/not/exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "error": "Not found" }));
    }
}
