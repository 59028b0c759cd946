use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub type JobId = Uuid;

/// Full contents of the job-record file, keyed by job id.
pub type JobMap = HashMap<JobId, JobRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Done,
    Failed,
}

/// `result` is set exactly when `status` is `done`; the constructors below are
/// the only way records are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct JobRecord {
    pub status: JobStatus,
    pub filename: String,
    pub result: Option<String>,
}

impl JobRecord {
    pub fn processing(filename: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Processing,
            filename: filename.into(),
            result: None,
        }
    }

    pub fn done(filename: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Done,
            filename: filename.into(),
            result: Some(result.into()),
        }
    }

    pub fn failed(filename: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            filename: filename.into(),
            result: None,
        }
    }
}
