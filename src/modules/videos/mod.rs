use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod handler;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videos", get(handler::list_videos))
        .route("/thumbnail/{filename}", get(handler::get_thumbnail))
}
