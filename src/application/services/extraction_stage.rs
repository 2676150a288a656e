use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{MediaDownloader, MediaIndexer};
use crate::domain::{AuditState, Evidence, IndexingJob, IndexingStatus, VideoId, VideoReference};

use super::cancellation::until_cancelled;
use super::local_artifact::LocalArtifact;
use super::{AuditError, UNSUBMITTED_JOB};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub accepted_hosts: Vec<String>,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub max_wait: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            accepted_hosts: default_accepted_hosts(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

pub fn default_accepted_hosts() -> Vec<String> {
    ["youtube.com", "www.youtube.com", "m.youtube.com", "youtu.be"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Turns a video reference into [`Evidence`] or a terminal failure.
pub struct ExtractionStage {
    downloader: Arc<dyn MediaDownloader>,
    indexer: Arc<dyn MediaIndexer>,
    config: ExtractionConfig,
}

impl ExtractionStage {
    pub fn new(
        downloader: Arc<dyn MediaDownloader>,
        indexer: Arc<dyn MediaIndexer>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            downloader,
            indexer,
            config,
        }
    }

    pub async fn run(&self, mut state: AuditState, cancel: &CancellationToken) -> AuditState {
        match self.extract(&mut state, cancel).await {
            Ok(evidence) => {
                tracing::info!(
                    transcript_chars = evidence.transcript.as_deref().map_or(0, str::len),
                    ocr_lines = evidence.on_screen_text.len(),
                    "Extraction completed"
                );
                state.evidence = Some(evidence);
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Extraction failed");
                state.fail(e.to_string());
            }
        }
        state
    }

    async fn extract(
        &self,
        state: &mut AuditState,
        cancel: &CancellationToken,
    ) -> Result<Evidence, AuditError> {
        let reference =
            VideoReference::parse(state.video_reference(), &self.config.accepted_hosts)?;
        let video_id = state.video_id();

        tracing::debug!(host = %reference.host(), "Downloading video");
        let path = until_cancelled(cancel, "download", self.downloader.download(&reference, video_id))
            .await?
            .map_err(AuditError::Acquisition)?;

        state.local_artifact_path = Some(path.clone());
        let artifact = LocalArtifact::new(path);

        let result = self.index(artifact.path(), video_id, cancel).await;

        artifact.release().await;
        state.local_artifact_path = None;

        result
    }

    async fn index(
        &self,
        path: &Path,
        video_id: VideoId,
        cancel: &CancellationToken,
    ) -> Result<Evidence, AuditError> {
        let job = until_cancelled(cancel, "upload", self.indexer.submit(path, video_id))
            .await?
            .map_err(|e| AuditError::ExtractionService {
                job: UNSUBMITTED_JOB.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(job = %job, "Video submitted for indexing");

        self.wait_until_processed(&job, cancel).await?;

        self.indexer
            .fetch_result(&job)
            .await
            .map_err(|e| AuditError::ExtractionService {
                job: job.to_string(),
                reason: e.to_string(),
            })
    }

    async fn wait_until_processed(
        &self,
        job: &IndexingJob,
        cancel: &CancellationToken,
    ) -> Result<(), AuditError> {
        let max_attempts = self.config.max_poll_attempts.max(1);
        let interval = self.config.poll_interval;

        let poll_future = async {
            for attempt in 1..=max_attempts {
                let status = until_cancelled(cancel, "polling", self.indexer.poll_status(job))
                    .await?
                    .map_err(|e| AuditError::ExtractionService {
                        job: job.to_string(),
                        reason: e.to_string(),
                    })?;

                tracing::debug!(attempt, status = %status, "Polled indexing job");

                match status {
                    IndexingStatus::Processed => return Ok(()),
                    IndexingStatus::Failed => {
                        return Err(AuditError::ExtractionService {
                            job: job.to_string(),
                            reason: "indexing service reported the job as failed".to_string(),
                        });
                    }
                    IndexingStatus::Pending if attempt < max_attempts => {
                        until_cancelled(cancel, "polling", tokio::time::sleep(interval)).await?;
                    }
                    IndexingStatus::Pending => {}
                }
            }

            Err(AuditError::ExtractionTimeout {
                job: job.to_string(),
                reason: format!("not processed after {} status checks", max_attempts),
            })
        };

        tokio::time::timeout(self.config.max_wait, poll_future)
            .await
            .map_err(|_| AuditError::ExtractionTimeout {
                job: job.to_string(),
                reason: format!("not processed within {:?}", self.config.max_wait),
            })?
    }
}
