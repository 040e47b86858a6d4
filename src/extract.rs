//! Request extractors whose rejections use the app's JSON error envelope.

use axum::extract::FromRequest;

use crate::Error;

/// Like [axum::Json], but rejections are converted into [Error] so that
/// malformed bodies get the same `{error, details}` response as other failures.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
