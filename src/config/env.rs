use std::env;
use std::str::FromStr;

use crate::common::error::AppError;

pub enum EnvKey {
    ServerPort,
    VideoDir,
    JarPath,
    JavaBin,
    ResultsDir,
    JobsFile,
    FfmpegPath,
    JobPollIntervalMs,
    JobMaxWaitTicks,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::VideoDir => "VIDEO_DIR",
            EnvKey::JarPath => "JAR_PATH",
            EnvKey::JavaBin => "JAVA_BIN",
            EnvKey::ResultsDir => "RESULTS_DIR",
            EnvKey::JobsFile => "JOBS_FILE",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::JobPollIntervalMs => "JOB_POLL_INTERVAL_MS",
            EnvKey::JobMaxWaitTicks => "JOB_MAX_WAIT_TICKS",
        }
    }
}

/// Required variable. Unset or empty values are configuration errors.
pub fn get(key: EnvKey) -> Result<String, AppError> {
    match env::var(key.as_str()) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(AppError::Configuration(format!(
            "{} not set in environment",
            key.as_str()
        ))),
    }
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match env::var(key.as_str()) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
