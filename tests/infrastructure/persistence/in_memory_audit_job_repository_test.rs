use std::time::Duration;

use vigil::application::ports::{AuditJobRepository, RepositoryError};
use vigil::domain::{AuditJob, AuditJobStatus, AuditState, JobId};
use vigil::infrastructure::persistence::InMemoryAuditJobRepository;

const URL: &str = "https://youtu.be/abc";

#[tokio::test]
async fn given_created_job_when_fetching_then_returns_queued_job() {
    let repository = InMemoryAuditJobRepository::new();
    let job = AuditJob::new(URL.to_string());

    repository.create(&job).await.unwrap();
    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();

    assert_eq!(stored.status, AuditJobStatus::Queued);
    assert_eq!(stored.video_url, URL);
    assert!(stored.result.is_none());
}

#[tokio::test]
async fn given_unknown_id_when_fetching_then_returns_none() {
    let repository = InMemoryAuditJobRepository::new();

    assert!(repository.get_by_id(JobId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn given_duplicate_job_when_creating_then_returns_constraint_violation() {
    let repository = InMemoryAuditJobRepository::new();
    let job = AuditJob::new(URL.to_string());
    repository.create(&job).await.unwrap();

    let result = repository.create(&job).await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
async fn given_running_job_when_completed_then_stores_result() {
    let repository = InMemoryAuditJobRepository::new();
    let job = AuditJob::new(URL.to_string());
    repository.create(&job).await.unwrap();

    repository
        .update_status(job.id, AuditJobStatus::Running)
        .await
        .unwrap();
    assert_eq!(
        repository.get_by_id(job.id).await.unwrap().unwrap().status,
        AuditJobStatus::Running
    );

    let mut state = AuditState::new(URL, "s");
    state.fail("no transcript available");
    repository.complete(job.id, state).await.unwrap();

    let stored = repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditJobStatus::Completed);
    assert_eq!(
        stored.result.unwrap().diagnostics(),
        ["no transcript available".to_string()]
    );
}

#[tokio::test]
async fn given_unknown_id_when_updating_then_returns_not_found() {
    let repository = InMemoryAuditJobRepository::new();

    let result = repository
        .update_status(JobId::new(), AuditJobStatus::Running)
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

async fn completed_job(repository: &InMemoryAuditJobRepository) -> AuditJob {
    let job = AuditJob::new(URL.to_string());
    repository.create(&job).await.unwrap();
    let mut state = AuditState::new(URL, "s");
    state.fail("download failed");
    repository.complete(job.id, state).await.unwrap();
    job
}

#[tokio::test]
async fn given_expired_completed_job_when_creating_another_then_it_is_evicted() {
    let repository = InMemoryAuditJobRepository::with_retention(Duration::ZERO);
    let finished = completed_job(&repository).await;

    let fresh = AuditJob::new(URL.to_string());
    repository.create(&fresh).await.unwrap();

    assert!(repository.get_by_id(finished.id).await.unwrap().is_none());
    assert!(
        repository
            .list_by_status(AuditJobStatus::Completed)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(repository.get_by_id(fresh.id).await.unwrap().is_some());
}

#[tokio::test]
async fn given_zero_retention_when_jobs_are_unfinished_then_they_are_kept() {
    let repository = InMemoryAuditJobRepository::with_retention(Duration::ZERO);
    let queued = AuditJob::new(URL.to_string());
    let running = AuditJob::new(URL.to_string());
    repository.create(&queued).await.unwrap();
    repository.create(&running).await.unwrap();
    repository
        .update_status(running.id, AuditJobStatus::Running)
        .await
        .unwrap();

    repository.create(&AuditJob::new(URL.to_string())).await.unwrap();

    assert!(repository.get_by_id(queued.id).await.unwrap().is_some());
    assert_eq!(
        repository
            .list_by_status(AuditJobStatus::Running)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn given_default_retention_when_job_just_completed_then_it_stays_queryable() {
    let repository = InMemoryAuditJobRepository::new();
    let finished = completed_job(&repository).await;

    repository.create(&AuditJob::new(URL.to_string())).await.unwrap();

    let stored = repository.get_by_id(finished.id).await.unwrap().unwrap();
    assert_eq!(stored.status, AuditJobStatus::Completed);
}
