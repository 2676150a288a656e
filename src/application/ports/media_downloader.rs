use std::io;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{VideoId, VideoReference};

/// Materializes a remote video as a local file.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Downloads `reference` and returns the local path. On error no file is left behind.
    async fn download(
        &self,
        reference: &VideoReference,
        video_id: VideoId,
    ) -> Result<PathBuf, DownloadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("downloader failed to start: {0}")]
    SpawnFailed(String),
    #[error("downloader exited with {status}: {stderr}")]
    ToolFailed { status: String, stderr: String },
    #[error("downloader produced no file at {0}")]
    NoOutput(String),
    #[error("download timed out after {0:?}")]
    Timeout(Duration),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
