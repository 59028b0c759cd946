use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::service::VideoService;
use crate::common::response::{ApiSuccess, ErrorBody};
use crate::state::AppState;

/// List video files available for analysis
#[utoipa::path(
    get,
    path = "/videos",
    responses(
        (status = 200, description = "Video filenames", body = Vec<String>),
        (status = 500, description = "Video directory unreadable", body = ErrorBody)
    ),
    tag = "Videos"
)]
pub async fn list_videos(State(state): State<AppState>) -> impl IntoResponse {
    match VideoService::list(state).await {
        Ok(videos) => ApiSuccess(videos, StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

/// First frame of a video as a JPEG stream
#[utoipa::path(
    get,
    path = "/thumbnail/{filename}",
    params(
        ("filename" = String, Path, description = "Video filename")
    ),
    responses(
        (status = 200, description = "JPEG image", content_type = "image/jpeg"),
        (status = 400, description = "Missing or invalid filename", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody),
        (status = 500, description = "Extraction failed", body = ErrorBody)
    ),
    tag = "Videos"
)]
pub async fn get_thumbnail(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    match VideoService::thumbnail(state, &filename).await {
        Ok(frames) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::IMAGE_JPEG.as_ref())],
            Body::from_stream(frames),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
