use utoipa::OpenApi;

use crate::common::response::ErrorBody;
use crate::modules::jobs::dto::SubmitJobResponse;
use crate::modules::jobs::model::{JobRecord, JobStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::videos::handler::list_videos,
        crate::modules::videos::handler::get_thumbnail,
        crate::modules::jobs::handler::submit_job,
        crate::modules::jobs::handler::job_status,
    ),
    components(
        schemas(ErrorBody, SubmitJobResponse, JobRecord, JobStatus)
    ),
    tags(
        (name = "Videos", description = "Source videos and thumbnails"),
        (name = "Jobs", description = "Color-tracking analysis jobs")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in ["/videos", "/thumbnail/{filename}", "/process/{id}", "/process/{id}/status"] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
