//! Request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CutoutConfig, SegmenterVariant};
use crate::error::SegmentError;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

/// Header reporting which variant produced the response.
pub const VARIANT_HEADER: &str = "x-segmenter-variant";

/// Health response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Optional per-request overrides for `POST /api/segment`.
#[derive(Debug, Default, Deserialize)]
pub struct SegmentQuery {
    pub threshold: Option<f32>,
    pub variant: Option<SegmenterVariant>,
}

/// Segment an uploaded image and return it as PNG.
pub async fn segment_image(
    State(state): State<AppState>,
    query: Result<Query<SegmentQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let cutout = query.threshold.map(|threshold| CutoutConfig {
        threshold,
        ..state.processor.config().cutout
    });
    if let Some(cutout) = &cutout {
        cutout.validate()?;
    }

    let upload = read_upload(&mut multipart).await?;
    debug!(bytes = upload.len(), "Received upload");

    let processor = Arc::clone(&state.processor);
    let variant = query.variant;
    let (used_variant, png) = tokio::task::spawn_blocking(move || {
        let result = processor.process_bytes_with(&upload, variant, cutout)?;
        let png = result.to_png_bytes()?;
        Ok::<_, SegmentError>((result.metadata.variant, png))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Segmentation task failed: {}", e)))??;

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("inline; filename=\"segmented.png\""),
        ),
        (
            HeaderName::from_static(VARIANT_HEADER),
            HeaderValue::from_static(used_variant.as_str()),
        ),
    ];
    Ok((StatusCode::OK, headers, png).into_response())
}

/// Pull the image bytes out of the multipart body.
///
/// Prefers the `file` field; otherwise takes the first field with a filename.
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Bytes> {
    let mut fallback = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let named_file = field.name() == Some(UPLOAD_FIELD);
        if !named_file && (fallback.is_some() || field.file_name().is_none()) {
            continue;
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if named_file {
            return Ok(bytes);
        }
        fallback = Some(bytes);
    }

    fallback.ok_or_else(|| {
        ApiError::bad_request(format!("Missing image upload field '{}'", UPLOAD_FIELD))
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::bad_request(format!("Malformed multipart body: {}", err.body_text()))
    }
}
