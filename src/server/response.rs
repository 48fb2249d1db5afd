use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::feed::FeedError;

pub const CONTENT_FETCHED: &str = "Channel content fetched successfully";

/// Success envelope: `{status, message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self { status: StatusCode::OK.as_u16(), message, data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Error envelope: `{status, message}`. Causes are logged, never serialized.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

#[cfg(test)]
impl ApiError {
    pub fn status(&self) -> StatusCode { self.status }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        let status = match &err {
            FeedError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FeedError::NotFound { publisher_id } => {
                tracing::debug!(%publisher_id, "unknown channel");
                StatusCode::NOT_FOUND
            }
            FeedError::StoreUnavailable(cause) => {
                tracing::error!(error = ?cause, "content store failure");
                StatusCode::SERVICE_UNAVAILABLE
            }
            FeedError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            FeedError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        };
        ApiError { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { status: self.status.as_u16(), message: &self.message };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn feed_errors_map_to_status_codes() {
        let cases = [
            (FeedError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (FeedError::NotFound { publisher_id: Uuid::nil() }, StatusCode::NOT_FOUND),
            (FeedError::store(anyhow::anyhow!("pool closed")), StatusCode::SERVICE_UNAVAILABLE),
            (FeedError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (FeedError::DeadlineExceeded, StatusCode::GATEWAY_TIMEOUT),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn store_cause_is_not_in_the_message() {
        let err = ApiError::from(FeedError::store(anyhow::anyhow!("password authentication failed")));
        assert_eq!(err.message, "content store unavailable");
    }
}
