use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::media::thumbnail::ThumbnailExtractor;
use crate::infrastructure::process::launcher::ProcessLauncher;
use crate::modules::jobs::repository::JobRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jobs: JobRepository,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub thumbnails: ThumbnailExtractor,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        jobs: JobRepository,
        launcher: Arc<dyn ProcessLauncher>,
        thumbnails: ThumbnailExtractor,
    ) -> Self {
        Self {
            config,
            jobs,
            launcher,
            thumbnails,
        }
    }
}
