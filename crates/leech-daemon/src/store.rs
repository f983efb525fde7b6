//! Persistent job store with atomic field-level updates.

use directories::ProjectDirs;
use leech_types::{JobId, LeechError, LeechJob};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during job store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to determine the application data directory.
    #[error("Failed to determine application data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to delete a file.
    #[error("Failed to delete file '{path}': {source}")]
    DeleteFile {
        /// The path that could not be deleted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read the jobs directory.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to serialize a job record.
    #[error("Failed to serialize job: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(JobId),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for LeechError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::JobNotFound(id) => Self::NotFound(id),
            other => Self::Store(other.to_string()),
        }
    }
}

/// Manages job records and completed artifacts.
///
/// Records are held in memory behind an async `RwLock` and written through
/// to `<base>/jobs/<id>.json` on every mutation, so the owning worker
/// (writer), progress subscriptions (readers), and external cancellation
/// (status writer) all see one authoritative copy. Completed artifacts live
/// under `<base>/downloads/`.
#[derive(Debug, Clone)]
pub struct JobStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    base_path: PathBuf,
    jobs_path: PathBuf,
    downloads_path: PathBuf,
    jobs: RwLock<HashMap<JobId, LeechJob>>,
}

impl JobStore {
    /// Opens a store at the given base path.
    ///
    /// Creates the `jobs/` and `downloads/` subdirectories if needed, and
    /// loads any job records persisted by earlier runs. Corrupt record
    /// files are skipped with a warning rather than failing the open.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created or scanned.
    pub fn open(base_path: PathBuf) -> Result<Self> {
        let jobs_path = base_path.join("jobs");
        let downloads_path = base_path.join("downloads");

        for path in [&base_path, &jobs_path, &downloads_path] {
            if !path.exists() {
                fs::create_dir_all(path).map_err(|e| StoreError::CreateDir {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }

        let jobs = Self::scan_jobs(&jobs_path)?;

        Ok(Self {
            inner: Arc::new(Inner {
                base_path,
                jobs_path,
                downloads_path,
                jobs: RwLock::new(jobs),
            }),
        })
    }

    /// Returns the default base path for leech state storage.
    ///
    /// Uses the `directories` crate to find the platform data directory
    /// (`~/.local/share/leech/` on Linux), falling back to `~/.leech/`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "leech").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Opens a store at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created or scanned.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path())
    }

    /// Returns the base path for state storage.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.inner.base_path
    }

    /// Returns the directory completed artifacts are stored under.
    #[must_use]
    pub fn downloads_path(&self) -> &Path {
        &self.inner.downloads_path
    }

    /// Returns the path of a job's record file.
    #[must_use]
    pub fn job_record_path(&self, job_id: JobId) -> PathBuf {
        self.inner.jobs_path.join(format!("{job_id}.json"))
    }

    /// Inserts a newly created job record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub async fn insert(&self, job: LeechJob) -> Result<()> {
        let mut jobs = self.inner.jobs.write().await;
        self.persist(&job).await?;
        jobs.insert(job.id, job);
        Ok(())
    }

    /// Returns a snapshot of the job record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::JobNotFound`] for unknown ids.
    pub async fn get(&self, job_id: JobId) -> Result<LeechJob> {
        let jobs = self.inner.jobs.read().await;
        jobs.get(&job_id)
            .cloned()
            .ok_or(StoreError::JobNotFound(job_id))
    }

    /// Lists all job records, newest first.
    pub async fn list(&self) -> Vec<LeechJob> {
        let jobs = self.inner.jobs.read().await;
        let mut jobs: Vec<LeechJob> = jobs.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// Applies one atomic read-modify-write to a job record.
    ///
    /// The mutation runs under the write lock, `updated_at` is refreshed,
    /// and the record is persisted before the lock is released, so
    /// concurrent readers never observe a partially-updated record.
    /// Returns the record as mutated.
    ///
    /// If the closure leaves the record unchanged (a guarded mutation that
    /// declined to touch a settled record), `updated_at` keeps its value and
    /// nothing is rewritten on disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::JobNotFound`] for unknown ids, or a
    /// persistence error (fatal to this operation).
    pub async fn update<F>(&self, job_id: JobId, mutate: F) -> Result<LeechJob>
    where
        F: FnOnce(&mut LeechJob),
    {
        let mut jobs = self.inner.jobs.write().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or(StoreError::JobNotFound(job_id))?;

        let before = job.clone();
        mutate(job);
        if *job == before {
            return Ok(before);
        }

        job.touch();
        let snapshot = job.clone();
        self.persist(&snapshot).await?;
        Ok(snapshot)
    }

    /// Deletes a job record and its file.
    ///
    /// Retention is an external concern; the engine itself never calls this.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::JobNotFound`] for unknown ids, or an error if
    /// the record file cannot be removed.
    pub async fn delete(&self, job_id: JobId) -> Result<()> {
        let mut jobs = self.inner.jobs.write().await;
        jobs.remove(&job_id)
            .ok_or(StoreError::JobNotFound(job_id))?;

        let path = self.job_record_path(job_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteFile { path, source: e }),
        }
    }

    /// Writes one record through to its JSON file. Callers hold the lock.
    async fn persist(&self, job: &LeechJob) -> Result<()> {
        let path = self.job_record_path(job.id);
        let json = serde_json::to_string_pretty(job)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::WriteFile { path, source: e })
    }

    /// Loads all parseable job records from the jobs directory.
    fn scan_jobs(jobs_path: &Path) -> Result<HashMap<JobId, LeechJob>> {
        let entries = fs::read_dir(jobs_path).map_err(|e| StoreError::ReadDir {
            path: jobs_path.to_path_buf(),
            source: e,
        })?;

        let mut jobs = HashMap::new();

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadDir {
                path: jobs_path.to_path_buf(),
                source: e,
            })?;

            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|e| StoreError::ReadFile {
                path: path.clone(),
                source: e,
            })?;

            match serde_json::from_str::<LeechJob>(&content) {
                Ok(job) => {
                    jobs.insert(job.id, job);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping corrupt job record");
                }
            }
        }

        Ok(jobs)
    }
}

/// Fallback for determining the home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".leech")
}

#[cfg(test)]
mod tests {
    use super::*;
    use leech_types::{JobSource, JobStatus};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn create_test_job() -> LeechJob {
        LeechJob::new(JobSource::Magnet("magnet:?xt=urn:btih:abc".into()))
    }

    #[tokio::test]
    async fn test_store_creation() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        assert!(store.base_path().exists());
        assert!(temp_dir.path().join("jobs").exists());
        assert!(temp_dir.path().join("downloads").exists());
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let job = create_test_job();
        let job_id = job.id;
        store.insert(job).await.unwrap();

        let loaded = store.get(job_id).await.unwrap();
        assert_eq!(loaded.id, job_id);
        assert_eq!(loaded.status, JobStatus::Queued);
        assert!(store.job_record_path(job_id).exists());
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let result = store.get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_is_persisted_and_touches() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let job = create_test_job();
        let job_id = job.id;
        let created = job.updated_at;
        store.insert(job).await.unwrap();

        let updated = store
            .update(job_id, |job| job.set_progress(40.0))
            .await
            .unwrap();
        assert_eq!(updated.progress, 40.0);
        assert_eq!(updated.status, JobStatus::Downloading);
        assert!(updated.updated_at >= created);

        // The write-through file carries the same mutation.
        let content = fs::read_to_string(store.job_record_path(job_id)).unwrap();
        let on_disk: LeechJob = serde_json::from_str(&content).unwrap();
        assert_eq!(on_disk.progress, 40.0);
    }

    #[tokio::test]
    async fn test_guarded_noop_update_leaves_terminal_record_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let job = create_test_job();
        let job_id = job.id;
        store.insert(job).await.unwrap();
        let settled = store
            .update(job_id, |job| job.mark_failed("Job cancelled"))
            .await
            .unwrap();

        // A worker's guarded progress write racing an external cancellation
        // declines the mutation; the settled record must not be rewritten.
        let after = store
            .update(job_id, |job| {
                if !job.is_finished() {
                    job.set_progress(50.0);
                }
            })
            .await
            .unwrap();

        assert_eq!(after, settled);
        assert_eq!(after.updated_at, settled.updated_at);

        let content = fs::read_to_string(store.job_record_path(job_id)).unwrap();
        let on_disk: LeechJob = serde_json::from_str(&content).unwrap();
        assert_eq!(on_disk.updated_at, settled.updated_at);
        assert_eq!(on_disk.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let result = store.update(Uuid::new_v4(), |job| job.set_progress(1.0)).await;
        assert!(matches!(result, Err(StoreError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let older = create_test_job();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = create_test_job();
        let newer_id = newer.id;

        store.insert(older).await.unwrap();
        store.insert(newer).await.unwrap();

        let jobs = store.list().await;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, newer_id);
    }

    #[tokio::test]
    async fn test_reopen_loads_persisted_jobs() {
        let temp_dir = TempDir::new().unwrap();
        let job = create_test_job();
        let job_id = job.id;

        {
            let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();
            store.insert(job).await.unwrap();
        }

        let reopened = JobStore::open(temp_dir.path().to_path_buf()).unwrap();
        let loaded = reopened.get(job_id).await.unwrap();
        assert_eq!(loaded.id, job_id);
    }

    #[tokio::test]
    async fn test_reopen_skips_corrupt_records() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();
            store.insert(create_test_job()).await.unwrap();
        }
        fs::write(temp_dir.path().join("jobs").join("garbage.json"), "{not json").unwrap();

        let reopened = JobStore::open(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let job = create_test_job();
        let job_id = job.id;
        store.insert(job).await.unwrap();

        store.delete(job_id).await.unwrap();
        assert!(matches!(
            store.get(job_id).await,
            Err(StoreError::JobNotFound(_))
        ));
        assert!(!store.job_record_path(job_id).exists());
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_updates() {
        let temp_dir = TempDir::new().unwrap();
        let store = JobStore::open(temp_dir.path().to_path_buf()).unwrap();

        let job = create_test_job();
        let job_id = job.id;
        store.insert(job).await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 1..=50 {
                    store
                        .update(job_id, |job| job.set_progress(f64::from(i) * 2.0))
                        .await
                        .unwrap();
                }
            })
        };

        // A reader never sees Downloading without the progress that came
        // with it in the same update.
        for _ in 0..50 {
            let job = store.get(job_id).await.unwrap();
            if job.status == JobStatus::Downloading {
                assert!(job.progress > 0.0);
            }
        }

        writer.await.unwrap();
        let job = store.get(job_id).await.unwrap();
        assert_eq!(job.progress, 100.0);
    }
}
