use std::sync::Arc;

use tokio::sync::Mutex;

use super::model::{JobId, JobRecord};
use crate::common::error::AppError;
use crate::infrastructure::store::job_store::JobStore;

/// Owns the job store and funnels every read-modify-write through one lock so
/// a submission and a watcher finishing at the same time cannot drop each
/// other's update.
#[derive(Clone)]
pub struct JobRepository {
    store: Arc<dyn JobStore>,
    write_lock: Arc<Mutex<()>>,
}

impl JobRepository {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn find_by_id(&self, id: JobId) -> Option<JobRecord> {
        self.store.load().await.remove(&id)
    }

    /// Inserts or replaces the record for `id`.
    pub async fn upsert(&self, id: JobId, record: JobRecord) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.store.load().await;
        jobs.insert(id, record);
        self.store.save(&jobs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::job_store::{FileJobStore, JobStore, MemoryJobStore};
    use crate::modules::jobs::model::JobStatus;
    use uuid::Uuid;

    #[tokio::test]
    async fn unknown_id_is_none() {
        let repo = JobRepository::new(Arc::new(MemoryJobStore::new()));
        assert!(repo.find_by_id(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let store = Arc::new(MemoryJobStore::new());
        let repo = JobRepository::new(store.clone());
        let id = Uuid::new_v4();

        repo.upsert(id, JobRecord::processing("clip.mp4")).await.unwrap();
        repo.upsert(id, JobRecord::done("clip.mp4", "out.csv")).await.unwrap();

        let record = repo.find_by_id(id).await.unwrap();
        assert_eq!(record.status, JobStatus::Done);
        assert_eq!(record.result.as_deref(), Some("out.csv"));
        assert_eq!(store.load().await.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_upserts_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileJobStore::new(dir.path().join("jobs.json")));
        let repo = JobRepository::new(store.clone());

        let ids: Vec<JobId> = (0..20).map(|_| Uuid::new_v4()).collect();
        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.upsert(id, JobRecord::processing(format!("{id}.mp4")))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let jobs = store.load().await;
        assert_eq!(jobs.len(), ids.len());
        assert!(ids.iter().all(|id| jobs.contains_key(id)));
    }
}
