//! Infers that a detached analysis process has finished by watching its output
//! file. There is no exit status to observe, so "the size did not change between
//! two consecutive ticks" is taken to mean "done". A writer that stalls for
//! longer than one interval will be reported done early.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::modules::jobs::model::{JobId, JobRecord, JobStatus};
use crate::modules::jobs::repository::JobRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Output does not exist yet.
    Waiting,
    Growing(u64),
    Stable(u64),
}

/// Remembers the size seen on the previous tick. The baseline is zero, so a
/// file that is still empty on its first sighting already counts as stable.
#[derive(Debug, Default)]
pub struct SizeTracker {
    last_size: u64,
}

impl SizeTracker {
    pub fn observe(&mut self, size: Option<u64>) -> Tick {
        match size {
            None => Tick::Waiting,
            Some(size) if size == self.last_size => Tick::Stable(size),
            Some(size) => {
                self.last_size = size;
                Tick::Growing(size)
            }
        }
    }
}

pub struct CompletionWatcher {
    job_id: JobId,
    filename: String,
    output_path: PathBuf,
    interval: Duration,
    max_ticks: u32,
    jobs: JobRepository,
}

impl CompletionWatcher {
    pub fn new(
        job_id: JobId,
        filename: impl Into<String>,
        output_path: impl Into<PathBuf>,
        jobs: JobRepository,
    ) -> Self {
        Self {
            job_id,
            filename: filename.into(),
            output_path: output_path.into(),
            interval: Duration::from_millis(crate::config::settings::DEFAULT_POLL_INTERVAL_MS),
            max_ticks: 0,
            jobs,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Ticks allowed before a job that never settles is marked failed; zero
    /// means no limit.
    pub fn max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn spawn(self) -> JoinHandle<JobStatus> {
        tokio::spawn(self.run())
    }

    /// Returns the status decided on, whether or not the store accepted it.
    pub async fn run(self) -> JobStatus {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; the first check happens one interval in.
        ticker.tick().await;

        let mut tracker = SizeTracker::default();
        let mut ticks: u32 = 0;

        loop {
            ticker.tick().await;
            ticks = ticks.saturating_add(1);

            match tracker.observe(output_size(&self.output_path).await) {
                Tick::Stable(size) => {
                    info!(job_id = %self.job_id, size, "Output stable, marking job done");
                    let result = result_name(&self.output_path);
                    self.record(JobRecord::done(&self.filename, result)).await;
                    return JobStatus::Done;
                }
                Tick::Growing(size) => {
                    debug!(job_id = %self.job_id, size, "Output still growing");
                }
                Tick::Waiting => {
                    debug!(job_id = %self.job_id, "Output not created yet");
                }
            }

            if self.max_ticks > 0 && ticks >= self.max_ticks {
                warn!(job_id = %self.job_id, ticks, "Output never settled, marking job failed");
                self.record(JobRecord::failed(&self.filename)).await;
                return JobStatus::Failed;
            }
        }
    }

    async fn record(&self, record: JobRecord) {
        if let Err(e) = self.jobs.upsert(self.job_id, record).await {
            error!(job_id = %self.job_id, error = %e, "Failed to persist job completion");
        }
    }
}

async fn output_size(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Some(meta.len()),
        Err(_) => None,
    }
}

fn result_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::AppError;
    use crate::infrastructure::store::job_store::{JobStore, MemoryJobStore};
    use crate::modules::jobs::model::JobMap;
    use async_trait::async_trait;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Serves a fixed mapping and refuses every write.
    struct ReadOnlyJobStore {
        jobs: JobMap,
    }

    #[async_trait]
    impl JobStore for ReadOnlyJobStore {
        async fn load(&self) -> JobMap {
            self.jobs.clone()
        }

        async fn save(&self, _jobs: &JobMap) -> Result<(), AppError> {
            Err(AppError::Persistence(std::io::Error::other("read-only file system")))
        }
    }

    const FAST: Duration = Duration::from_millis(20);

    fn repository() -> JobRepository {
        JobRepository::new(Arc::new(MemoryJobStore::new()))
    }

    #[test]
    fn tracker_waits_then_grows_then_settles() {
        let mut tracker = SizeTracker::default();

        assert_eq!(tracker.observe(None), Tick::Waiting);
        assert_eq!(tracker.observe(Some(10)), Tick::Growing(10));
        assert_eq!(tracker.observe(Some(25)), Tick::Growing(25));
        assert_eq!(tracker.observe(Some(25)), Tick::Stable(25));
    }

    #[test]
    fn empty_file_on_first_sighting_is_stable() {
        let mut tracker = SizeTracker::default();
        assert_eq!(tracker.observe(Some(0)), Tick::Stable(0));
    }

    #[test]
    fn missing_file_does_not_reset_the_baseline() {
        let mut tracker = SizeTracker::default();
        tracker.observe(Some(7));
        assert_eq!(tracker.observe(None), Tick::Waiting);
        assert_eq!(tracker.observe(Some(7)), Tick::Stable(7));
    }

    #[tokio::test]
    async fn stable_output_marks_job_done_with_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let output = dir.path().join(format!("{id}.csv"));
        std::fs::write(&output, b"0.00,1,2\n").unwrap();

        let jobs = repository();
        jobs.upsert(id, JobRecord::processing("clip.mp4")).await.unwrap();

        let status = CompletionWatcher::new(id, "clip.mp4", &output, jobs.clone())
            .interval(FAST)
            .run()
            .await;

        assert_eq!(status, JobStatus::Done);
        let record = jobs.find_by_id(id).await.unwrap();
        assert_eq!(record, JobRecord::done("clip.mp4", format!("{id}.csv")));
    }

    #[tokio::test]
    async fn output_that_never_appears_fails_after_budget() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let jobs = repository();
        jobs.upsert(id, JobRecord::processing("clip.mp4")).await.unwrap();

        let status = CompletionWatcher::new(id, "clip.mp4", dir.path().join("never.csv"), jobs.clone())
            .interval(FAST)
            .max_ticks(3)
            .run()
            .await;

        assert_eq!(status, JobStatus::Failed);
        assert_eq!(
            jobs.find_by_id(id).await.unwrap(),
            JobRecord::failed("clip.mp4")
        );
    }

    #[tokio::test]
    async fn growing_output_keeps_job_processing() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let output = dir.path().join("growing.csv");
        let jobs = repository();
        jobs.upsert(id, JobRecord::processing("clip.mp4")).await.unwrap();

        std::fs::write(&output, b"timestamp,x,y\n").unwrap();
        let writer_path = output.clone();
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            let mut file = tokio::fs::OpenOptions::new()
                .append(true)
                .open(&writer_path)
                .await
                .unwrap();
            loop {
                file.write_all(b"0.00,-1,-1\n").await.unwrap();
                file.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let handle = CompletionWatcher::new(id, "clip.mp4", &output, jobs.clone())
            .interval(Duration::from_millis(50))
            .spawn();

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!handle.is_finished());
        assert_eq!(
            jobs.find_by_id(id).await.unwrap().status,
            JobStatus::Processing
        );

        writer.abort();
        let status = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, JobStatus::Done);
    }

    #[tokio::test]
    async fn store_failure_is_absorbed_and_job_stays_processing() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let output = dir.path().join(format!("{id}.csv"));
        std::fs::write(&output, b"0.00,1,2\n").unwrap();

        let jobs = JobRepository::new(Arc::new(ReadOnlyJobStore {
            jobs: JobMap::from([(id, JobRecord::processing("clip.mp4"))]),
        }));

        let status = tokio::time::timeout(
            Duration::from_secs(5),
            CompletionWatcher::new(id, "clip.mp4", &output, jobs.clone())
                .interval(FAST)
                .spawn(),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(status, JobStatus::Done);
        assert_eq!(
            jobs.find_by_id(id).await.unwrap(),
            JobRecord::processing("clip.mp4")
        );
    }
}
