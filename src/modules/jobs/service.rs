use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::dto::{normalize_color, ProcessQuery, SubmitJobResponse};
use super::model::JobRecord;
use crate::common::error::AppError;
use crate::infrastructure::process::launcher::AnalysisRequest;
use crate::modules::videos::service::VideoService;
use crate::state::AppState;
use crate::workers::completion_watcher::CompletionWatcher;

pub struct JobService;

impl JobService {
    /// Registers a `processing` job, starts the analysis and hands the job to a
    /// completion watcher. Returns without waiting for the analysis.
    pub async fn submit(
        state: AppState,
        filename: String,
        query: ProcessQuery,
    ) -> Result<SubmitJobResponse, AppError> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if filename.trim().is_empty() || !present(&query.target_color) || !present(&query.threshold) {
            return Err(AppError::Validation(
                "Missing filename, targetColor, or threshold".to_string(),
            ));
        }

        let video_path = VideoService::resolve(&state.config.video_dir, &filename)?;
        let is_file = tokio::fs::metadata(&video_path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            warn!(path = %video_path.display(), "Video file not found");
            return Err(AppError::Validation("Video file does not exist".to_string()));
        }

        query.validate()?;
        let target_color = normalize_color(query.target_color.as_deref().unwrap_or_default()).to_string();
        let threshold = query.threshold.as_deref().unwrap_or_default().trim().to_string();

        let jar_path = &state.config.jar_path;
        if !tokio::fs::try_exists(jar_path).await.unwrap_or(false) {
            error!(path = %jar_path.display(), "JAR file not found");
            return Err(AppError::Configuration("JAR file not found".to_string()));
        }

        let results_dir = &state.config.results_dir;
        if !tokio::fs::try_exists(results_dir).await.unwrap_or(false) {
            info!(path = %results_dir.display(), "Creating results directory");
            tokio::fs::create_dir_all(results_dir).await.map_err(|e| {
                error!(path = %results_dir.display(), error = %e, "Unable to create results directory");
                AppError::Configuration("Unable to create results directory".to_string())
            })?;
        }

        let job_id = Uuid::new_v4();
        let output_path = results_dir.join(format!("{job_id}.csv"));
        state
            .jobs
            .upsert(job_id, JobRecord::processing(&filename))
            .await?;

        let request = AnalysisRequest {
            video_path,
            output_path: output_path.clone(),
            target_color,
            threshold,
        };
        if let Err(e) = state.launcher.launch(&request) {
            if let Err(store_err) = state.jobs.upsert(job_id, JobRecord::failed(&filename)).await {
                error!(%job_id, error = %store_err, "Failed to record launch failure");
            }
            return Err(e);
        }

        CompletionWatcher::new(job_id, &filename, output_path, state.jobs.clone())
            .interval(state.config.poll_interval())
            .max_ticks(state.config.job_max_wait_ticks)
            .spawn();

        info!(%job_id, %filename, "Job submitted");
        Ok(SubmitJobResponse { job_id })
    }

    pub async fn status(state: AppState, job_id: &str) -> Result<JobRecord, AppError> {
        let not_found = || AppError::NotFound("Job not found".to_string());
        let id = Uuid::parse_str(job_id).map_err(|_| not_found())?;

        state.jobs.find_by_id(id).await.ok_or_else(not_found)
    }
}
