//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ffi::ErrorCode;
use serde::Serialize;

/// The message returned when request data fails a validation rule.
pub const VALIDATION_ERROR: &str = "Data validation failed";
/// The message returned when a request is malformed, e.g. has a bad ID.
pub const INVALID_REQUEST: &str = "Invalid request data";
/// The message returned when a transaction ID does not exist.
pub const TRANSACTION_NOT_FOUND: &str = "Transaction not found";
/// The message returned when the database fails for an unknown reason.
pub const DATABASE_ERROR: &str = "Database operation failed";

/// Input that broke a validation rule.
///
/// The contained message is safe to show to the client and explains which
/// rule was broken, e.g. "Amount must be greater than 0".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    /// Create a validation error with a client facing `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The client facing message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// How an [Error] should be treated by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client sent malformed or out of range data and may resubmit.
    Validation,
    /// The referenced record does not exist.
    NotFound,
    /// The underlying store failed, including unique key conflicts.
    Persistence,
    /// The client sent too many requests in a short period of time.
    RateLimited,
    /// Something unexpected went wrong on the server.
    Internal,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body or query broke a validation rule.
    #[error("data validation failed: {0}")]
    Validation(ValidationError),

    /// The request itself is malformed, e.g. the transaction ID in the path is
    /// not a positive integer.
    #[error("invalid request: {0}")]
    InvalidRequest(ValidationError),

    /// The request body could not be parsed as JSON of the expected shape.
    #[error("could not parse the JSON body: {0}")]
    InvalidJson(String),

    /// A request with a body did not declare a JSON content type.
    #[error("the request content type must be application/json")]
    UnsupportedContentType,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A write clashed with a unique constraint in the database.
    #[error("a record with the same unique key already exists")]
    DuplicateRecord,

    /// The database could not be opened or is busy.
    #[error("could not connect to the database: {0}")]
    DatabaseUnavailable(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The default page size is outside `1..=max_page_size`.
    #[error("invalid default page size {0}, expected 1 to {1}")]
    InvalidPageSize(u64, u64),

    /// The client exceeded its request allowance.
    #[error("too many requests")]
    TooManyRequests,

    /// Any other unexpected error.
    ///
    /// The string should only be logged on the server.
    #[error("an unexpected error occurred: {0}")]
    Internal(String),
}

impl Error {
    /// Classify the error for the HTTP layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_)
            | Error::InvalidRequest(_)
            | Error::InvalidJson(_)
            | Error::UnsupportedContentType => ErrorKind::Validation,
            Error::NotFound => ErrorKind::NotFound,
            Error::DuplicateRecord
            | Error::DatabaseUnavailable(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => ErrorKind::Persistence,
            Error::TooManyRequests => ErrorKind::RateLimited,
            Error::InvalidTimezone(_) | Error::InvalidPageSize(..) | Error::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// The HTTP status code for this error.
    ///
    /// Unique key conflicts are the client's fault, so they are reported as a
    /// bad request even though they come from the store.
    pub fn status_code(&self) -> StatusCode {
        if *self == Error::DuplicateRecord {
            return StatusCode::BAD_REQUEST;
        }

        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Persistence | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        match self {
            Error::Validation(error) => ErrorBody::with_details(VALIDATION_ERROR, error.0),
            Error::InvalidRequest(error) => ErrorBody::with_details(INVALID_REQUEST, error.0),
            Error::InvalidJson(details) => ErrorBody::with_details("Invalid JSON format", details),
            Error::UnsupportedContentType => {
                ErrorBody::new("Content-Type must be application/json")
            }
            Error::NotFound => ErrorBody::new(TRANSACTION_NOT_FOUND),
            Error::DuplicateRecord => ErrorBody::new("Record already exists"),
            Error::DatabaseUnavailable(_) | Error::DatabaseLockError => {
                ErrorBody::new("Database connection failed")
            }
            Error::SqlError(_) => ErrorBody::new(DATABASE_ERROR),
            Error::TooManyRequests => ErrorBody::new("Too many requests"),
            Error::InvalidTimezone(_) | Error::InvalidPageSize(..) | Error::Internal(_) => {
                ErrorBody::new("Internal server error")
            }
        }
    }
}

/// The JSON body sent for every failed request.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    /// A short, stable description of the failure.
    pub error: String,
    /// More specific information, e.g. which validation rule was broken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_owned(),
            details: None,
        }
    }

    fn with_details(error: &str, details: String) -> Self {
        Self {
            error: error.to_owned(),
            details: Some(details),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::Validation(value)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code:
                        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
                },
                _,
            ) => Error::DuplicateRecord,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code:
                        code @ (ErrorCode::CannotOpen
                        | ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::NotADatabase),
                    extended_code: _,
                },
                _,
            ) => {
                tracing::error!("the database is unavailable: {code:?}");
                Error::DatabaseUnavailable(format!("{code:?}"))
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => Error::UnsupportedContentType,
            rejection => Error::InvalidJson(rejection.body_text()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::ffi;

    use super::{Error, ErrorKind, ValidationError};

    #[test]
    fn unique_constraint_maps_to_duplicate_record() {
        let error = rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed".to_owned()),
        );

        let got: Error = error.into();

        assert_eq!(got, Error::DuplicateRecord);
        assert_eq!(got.kind(), ErrorKind::Persistence);
        assert_eq!(got.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let got: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(got, Error::NotFound);
        assert_eq!(got.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn busy_database_maps_to_unavailable() {
        let error =
            rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_BUSY), None);

        let got: Error = error.into();

        assert!(matches!(got, Error::DatabaseUnavailable(_)));
        assert_eq!(got.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_is_bad_request() {
        let error: Error = ValidationError::new("Amount must be greater than 0").into();

        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn response_body_has_error_and_details() {
        let response =
            Error::Validation(ValidationError::new("Category cannot be empty")).into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");
        let json: serde_json::Value =
            serde_json::from_slice(&body).expect("response body is not JSON");

        assert_eq!(json["error"], "Data validation failed");
        assert_eq!(json["details"], "Category cannot be empty");
    }

    #[tokio::test]
    async fn response_body_omits_missing_details() {
        let response = Error::NotFound.into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");
        let json: serde_json::Value =
            serde_json::from_slice(&body).expect("response body is not JSON");

        assert_eq!(json["error"], "Transaction not found");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn too_many_requests_is_rate_limited() {
        assert_eq!(Error::TooManyRequests.kind(), ErrorKind::RateLimited);
        assert_eq!(
            Error::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
