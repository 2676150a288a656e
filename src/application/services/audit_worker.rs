use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AuditJobRepository, RepositoryError};
use crate::domain::{AuditJobStatus, AuditState, JobId};

use super::WorkflowEngine;

pub const DEFAULT_MAX_CONCURRENT_AUDITS: usize = 4;
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(45 * 60);

/// One queued audit run.
///
/// `job_id` is set for runs registered in the job repository; `responder`
/// is set when a caller is waiting for the final state.
pub struct AuditMessage {
    pub job_id: Option<JobId>,
    pub state: AuditState,
    pub cancel: CancellationToken,
    pub responder: Option<oneshot::Sender<AuditState>>,
}

impl AuditMessage {
    pub fn tracked(job_id: JobId, state: AuditState) -> Self {
        Self {
            job_id: Some(job_id),
            state,
            cancel: CancellationToken::new(),
            responder: None,
        }
    }

    pub fn awaited(
        state: AuditState,
        cancel: CancellationToken,
    ) -> (Self, oneshot::Receiver<AuditState>) {
        let (tx, rx) = oneshot::channel();
        let msg = Self {
            job_id: None,
            state,
            cancel,
            responder: Some(tx),
        };
        (msg, rx)
    }
}

pub struct AuditWorker {
    receiver: mpsc::Receiver<AuditMessage>,
    engine: Arc<WorkflowEngine>,
    job_repository: Arc<dyn AuditJobRepository>,
    permits: Arc<Semaphore>,
    run_timeout: Duration,
}

impl AuditWorker {
    pub fn new(
        receiver: mpsc::Receiver<AuditMessage>,
        engine: Arc<WorkflowEngine>,
        job_repository: Arc<dyn AuditJobRepository>,
        max_concurrent_audits: usize,
        run_timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            engine,
            job_repository,
            permits: Arc::new(Semaphore::new(max_concurrent_audits.max(1))),
            run_timeout,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.permits.available_permits(),
            run_timeout = ?self.run_timeout,
            "Audit worker started"
        );
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                msg = self.receiver.recv() => {
                    let Some(msg) = msg else { break };
                    let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                        tracing::error!("Audit worker semaphore closed");
                        break;
                    };
                    let engine = Arc::clone(&self.engine);
                    let repository = Arc::clone(&self.job_repository);
                    let run_timeout = self.run_timeout;
                    tasks.spawn(async move {
                        let _permit = permit;
                        if let Err(e) =
                            process_job(&engine, repository.as_ref(), msg, run_timeout).await
                        {
                            tracing::error!(error = %e, "Audit job bookkeeping failed");
                        }
                    });
                }
                Some(joined) = tasks.join_next() => log_join(joined),
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }
        tracing::info!("Audit worker stopped: channel closed");
    }
}

async fn process_job(
    engine: &WorkflowEngine,
    repository: &dyn AuditJobRepository,
    msg: AuditMessage,
    run_timeout: Duration,
) -> Result<(), AuditWorkerError> {
    let AuditMessage {
        job_id,
        state,
        cancel,
        responder,
    } = msg;

    if let Some(id) = job_id {
        tracing::debug!(job_id = %id.as_uuid(), "Audit job running");
        if let Err(e) = repository.update_status(id, AuditJobStatus::Running).await {
            tracing::warn!(
                job_id = %id.as_uuid(),
                error = %e,
                "Could not mark audit job running; running it anyway"
            );
        }
    }

    let final_state = run_bounded(engine, state, &cancel, run_timeout).await;

    let recorded = match job_id {
        Some(id) => {
            let status = final_state.final_status();
            let recorded = repository.complete(id, final_state.clone()).await;
            if recorded.is_ok() {
                tracing::info!(job_id = %id.as_uuid(), status = %status, "Audit job completed");
            }
            recorded
        }
        None => Ok(()),
    };

    if let Some(responder) = responder {
        if responder.send(final_state).is_err() {
            tracing::debug!("Audit caller went away before the result was ready");
        }
    }

    recorded.map_err(AuditWorkerError::from)
}

/// Runs the engine, cancelling the run once `run_timeout` elapses. The stages
/// observe the token, so the returned state is a settled `Cancelled` failure.
async fn run_bounded(
    engine: &WorkflowEngine,
    state: AuditState,
    cancel: &CancellationToken,
    run_timeout: Duration,
) -> AuditState {
    let run = engine.run(state, cancel);
    tokio::pin!(run);

    tokio::select! {
        final_state = &mut run => final_state,
        _ = tokio::time::sleep(run_timeout) => {
            tracing::warn!(timeout = ?run_timeout, "Audit run exceeded its time limit; cancelling");
            cancel.cancel();
            run.await
        }
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Audit task aborted");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditWorkerError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
