use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::modules::jobs::model::{JobMap, JobRecord};

/// Backing storage for job records. Every read returns the whole mapping and
/// every write replaces it; callers serialize their own read-modify-write.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Never fails: a missing or unreadable artifact is an empty mapping.
    async fn load(&self) -> JobMap;

    async fn save(&self, jobs: &JobMap) -> Result<(), AppError>;
}

/// Pretty-printed JSON file, replaced through a sibling temp file and rename so
/// a reader never sees a half-written mapping.
pub struct FileJobStore {
    path: PathBuf,
}

impl FileJobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "jobs.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn load(&self) -> JobMap {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return JobMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unable to read job store");
                return JobMap::new();
            }
        };

        let entries: HashMap<String, serde_json::Value> = match serde_json::from_slice(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Job store is unparsable, starting empty");
                return JobMap::new();
            }
        };

        // One bad entry must not take the rest of the file down with it.
        entries
            .into_iter()
            .filter_map(|(key, value)| {
                let Ok(id) = Uuid::parse_str(&key) else {
                    warn!(path = %self.path.display(), key = %key, "Skipping job record with a non-UUID id");
                    return None;
                };
                match serde_json::from_value::<JobRecord>(value) {
                    Ok(record) => Some((id, record)),
                    Err(e) => {
                        warn!(path = %self.path.display(), %id, error = %e, "Skipping malformed job record");
                        None
                    }
                }
            })
            .collect()
    }

    async fn save(&self, jobs: &JobMap) -> Result<(), AppError> {
        let body = serde_json::to_vec_pretty(jobs).map_err(std::io::Error::from)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &body).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), jobs = jobs.len(), "Job store written");
        Ok(())
    }
}

/// Process-local store used by tests and throwaway runs.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<JobMap>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn load(&self) -> JobMap {
        self.jobs.lock().await.clone()
    }

    async fn save(&self, jobs: &JobMap) -> Result<(), AppError> {
        *self.jobs.lock().await = jobs.clone();
        Ok(())
    }
}
