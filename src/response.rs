//! The JSON envelopes wrapped around successful API responses.
//!
//! Failures are handled by [crate::Error], which produces `{error, details?}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::pagination::Pagination;

/// A successful response: `{"data"?: ..., "message"?: ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    /// The payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A human readable summary of what happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    /// A 200 OK response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status: StatusCode::OK,
        }
    }

    /// A 201 Created response carrying `data`.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    /// Attach a message to the response.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl ApiResponse<()> {
    /// A 200 OK response with only a message.
    pub fn message(message: &str) -> Self {
        Self {
            data: None,
            message: Some(message.to_owned()),
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// A page of results: `{"data": [...], "pagination": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedResponse<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// Where this page sits in the full result set.
    pub pagination: Pagination,
}

impl<T: Serialize> IntoResponse for PaginatedResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::json;

    use crate::pagination::{Pagination, PaginationParams};

    use super::{ApiResponse, PaginatedResponse};

    #[test]
    fn omits_missing_fields() {
        let got = serde_json::to_value(ApiResponse::message("Transaction deleted successfully"))
            .expect("could not serialize response");

        assert_eq!(got, json!({"message": "Transaction deleted successfully"}));
    }

    #[test]
    fn created_response_has_status_201() {
        let response = ApiResponse::created(1).with_message("done").into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn paginated_response_shape() {
        let response = PaginatedResponse {
            data: vec![1, 2],
            pagination: Pagination::new(PaginationParams { page: 1, limit: 2 }, 3),
        };

        let got = serde_json::to_value(response).expect("could not serialize response");

        assert_eq!(
            got,
            json!({
                "data": [1, 2],
                "pagination": {
                    "page": 1,
                    "limit": 2,
                    "totalCount": 3,
                    "totalPages": 2,
                    "hasNext": true,
                    "hasPrev": false,
                }
            })
        );
    }
}
