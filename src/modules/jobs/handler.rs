use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::dto::{ProcessQuery, SubmitJobResponse};
use super::model::JobRecord;
use super::service::JobService;
use crate::common::error::AppError;
use crate::common::response::{ApiSuccess, ErrorBody};
use crate::state::AppState;

/// Submit a color-tracking analysis for a video
#[utoipa::path(
    post,
    path = "/process/{id}",
    params(
        ("id" = String, Path, description = "Video filename"),
        ProcessQuery
    ),
    responses(
        (status = 202, description = "Job accepted", body = SubmitJobResponse),
        (status = 400, description = "Missing parameters or video absent", body = ErrorBody),
        (status = 500, description = "Analysis program missing or failed to start", body = ErrorBody)
    ),
    tag = "Jobs"
)]
pub async fn submit_job(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    query: Result<Query<ProcessQuery>, QueryRejection>,
) -> impl IntoResponse {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return AppError::Validation(rejection.body_text()).into_response(),
    };
    match JobService::submit(state, filename, query).await {
        Ok(res) => ApiSuccess(res, StatusCode::ACCEPTED).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Current state of a job
#[utoipa::path(
    get,
    path = "/process/{id}/status",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job record", body = JobRecord),
        (status = 404, description = "Job not found", body = ErrorBody)
    ),
    tag = "Jobs"
)]
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match JobService::status(state, &job_id).await {
        Ok(record) => ApiSuccess(record, StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}
