use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::{Evidence, IndexingJob, IndexingStatus, VideoId};

/// Remote media-intelligence service that turns a video into transcript and OCR text.
#[async_trait]
pub trait MediaIndexer: Send + Sync {
    async fn submit(&self, path: &Path, video_id: VideoId)
    -> Result<IndexingJob, MediaIndexerError>;

    async fn poll_status(&self, job: &IndexingJob) -> Result<IndexingStatus, MediaIndexerError>;

    async fn fetch_result(&self, job: &IndexingJob) -> Result<Evidence, MediaIndexerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaIndexerError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("indexing result not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
