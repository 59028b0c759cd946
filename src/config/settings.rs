use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::common::error::AppError;
use crate::config::env::{self, EnvKey};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_MAX_WAIT_TICKS: u32 = 1800;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub video_dir: PathBuf,
    pub jar_path: PathBuf,
    pub java_bin: String,
    pub results_dir: PathBuf,
    pub jobs_file: PathBuf,
    pub ffmpeg_path: String,
    pub job_poll_interval_ms: u64,
    /// Zero disables the budget and lets a job stay `processing` forever.
    pub job_max_wait_ticks: u32,
}

impl AppConfig {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            video_dir: env::get(EnvKey::VideoDir)?.into(),
            jar_path: env::get(EnvKey::JarPath)?.into(),
            java_bin: env::get_or(EnvKey::JavaBin, "java"),
            results_dir: env::get(EnvKey::ResultsDir)?.into(),
            jobs_file: env::get(EnvKey::JobsFile)?.into(),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            job_poll_interval_ms: env::get_parsed(
                EnvKey::JobPollIntervalMs,
                DEFAULT_POLL_INTERVAL_MS,
            ),
            job_max_wait_ticks: env::get_parsed(EnvKey::JobMaxWaitTicks, DEFAULT_MAX_WAIT_TICKS),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.job_poll_interval_ms.max(1))
    }
}
