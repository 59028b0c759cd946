use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

// Both routes share the `{id}` segment name: a filename on submit, a job id on status.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process/{id}", post(handler::submit_job))
        .route("/process/{id}/status", get(handler::job_status))
}
