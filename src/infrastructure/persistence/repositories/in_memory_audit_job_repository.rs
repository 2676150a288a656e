use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{AuditJobRepository, RepositoryError};
use crate::domain::{AuditJob, AuditJobStatus, AuditState, JobId};

pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Process-local job registry. Jobs do not survive a restart.
///
/// Completed jobs are evicted once they have been finished for longer than
/// the retention window; queued and running jobs are never evicted.
pub struct InMemoryAuditJobRepository {
    jobs: RwLock<HashMap<JobId, AuditJob>>,
    retention: TimeDelta,
}

impl Default for InMemoryAuditJobRepository {
    fn default() -> Self {
        Self::with_retention(DEFAULT_JOB_RETENTION)
    }
}

impl InMemoryAuditJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention: TimeDelta::from_std(retention).unwrap_or(TimeDelta::MAX),
        }
    }

    fn evict_expired(&self, jobs: &mut HashMap<JobId, AuditJob>) {
        let now = Utc::now();
        let before = jobs.len();
        jobs.retain(|_, job| {
            job.status != AuditJobStatus::Completed || now - job.updated_at < self.retention
        });
        let evicted = before - jobs.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = jobs.len(), "Evicted expired audit jobs");
        }
    }
}

#[async_trait]
impl AuditJobRepository for InMemoryAuditJobRepository {
    async fn create(&self, job: &AuditJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        self.evict_expired(&mut jobs);
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "job {} already exists",
                job.id.as_uuid()
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<AuditJob>, RepositoryError> {
        let now = Utc::now();
        Ok(self
            .jobs
            .read()
            .await
            .get(&id)
            .filter(|job| {
                job.status != AuditJobStatus::Completed || now - job.updated_at < self.retention
            })
            .cloned())
    }

    async fn update_status(
        &self,
        id: JobId,
        status: AuditJobStatus,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        job.status = status;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn complete(&self, id: JobId, result: AuditState) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        self.evict_expired(&mut jobs);
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        job.status = AuditJobStatus::Completed;
        job.result = Some(result);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn list_by_status(&self, status: AuditJobStatus) -> Result<Vec<AuditJob>, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        self.evict_expired(&mut jobs);
        Ok(jobs
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect())
    }
}
