//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::SegmentError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Segment(#[from] SegmentError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Segment(err) => match err {
                SegmentError::Decode(_) | SegmentError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
                SegmentError::DimensionTooSmall { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                SegmentError::Encode(_)
                | SegmentError::Io(_)
                | SegmentError::Model(_)
                | SegmentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Rejected request");
        }

        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_error_status_mapping() {
        let decode = image::load_from_memory(b"nope").unwrap_err();
        assert_eq!(
            ApiError::from(SegmentError::Decode(decode)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SegmentError::dimension_too_small(5, 5, 10)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(SegmentError::invalid_config("threshold")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SegmentError::model("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transparent_message() {
        let err = ApiError::from(SegmentError::dimension_too_small(5, 5, 10));
        assert!(err.to_string().starts_with("Image dimensions 5x5"));
        assert_eq!(
            ApiError::bad_request("missing").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadTooLarge("big".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
