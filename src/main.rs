use std::net::SocketAddr;
use std::sync::Arc;

use centroid_tracker::app;
use centroid_tracker::config::settings::AppConfig;
use centroid_tracker::infrastructure::media::thumbnail::ThumbnailExtractor;
use centroid_tracker::infrastructure::process::launcher::CommandLauncher;
use centroid_tracker::infrastructure::store::job_store::FileJobStore;
use centroid_tracker::modules::jobs::repository::JobRepository;
use centroid_tracker::state::AppState;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new()?;
    let jobs = JobRepository::new(Arc::new(FileJobStore::new(&config.jobs_file)));
    let launcher = Arc::new(CommandLauncher::from_config(&config));
    let thumbnails = ThumbnailExtractor::new(&config.ffmpeg_path);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));

    info!(
        videos = %config.video_dir.display(),
        results = %config.results_dir.display(),
        jobs_file = %config.jobs_file.display(),
        "Configuration loaded"
    );

    let state = AppState::new(config, jobs, launcher, thumbnails);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
