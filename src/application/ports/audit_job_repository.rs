use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{AuditJob, AuditJobStatus, AuditState, JobId};

#[async_trait]
pub trait AuditJobRepository: Send + Sync {
    async fn create(&self, job: &AuditJob) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<AuditJob>, RepositoryError>;

    async fn update_status(&self, id: JobId, status: AuditJobStatus)
    -> Result<(), RepositoryError>;

    async fn complete(&self, id: JobId, result: AuditState) -> Result<(), RepositoryError>;

    async fn list_by_status(&self, status: AuditJobStatus) -> Result<Vec<AuditJob>, RepositoryError>;
}
