use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{DownloadError, MediaDownloader};
use crate::domain::{VideoId, VideoReference};
use crate::presentation::config::DownloaderSettings;

const MAX_STDERR_CHARS: usize = 500;

/// Downloads videos by shelling out to `yt-dlp`.
///
/// Each run writes `<output_dir>/<video_id>.mp4`, so concurrent runs never
/// share a file.
pub struct YtDlpDownloader {
    binary: String,
    output_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<String>, output_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            output_dir: output_dir.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &DownloaderSettings) -> Self {
        Self::new(
            settings.binary.clone(),
            settings.output_dir.clone(),
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    pub fn output_path(&self, video_id: VideoId) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", video_id))
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    #[tracing::instrument(skip(self, reference), fields(video_id = %video_id, host = %reference.host()))]
    async fn download(
        &self,
        reference: &VideoReference,
        video_id: VideoId,
    ) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let output = self.output_path(video_id);

        let mut command = Command::new(&self.binary);
        command
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-progress")
            .args(["-f", "best[ext=mp4]/best"])
            .args(["--merge-output-format", "mp4"])
            .arg("-o")
            .arg(&output)
            .arg(reference.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| DownloadError::SpawnFailed(format!("{}: {}", self.binary, e)))?;

        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Err(_) => Err(DownloadError::Timeout(self.timeout)),
            Ok(Err(e)) => Err(DownloadError::Io(e)),
            Ok(Ok(out)) if !out.status.success() => Err(DownloadError::ToolFailed {
                status: out.status.to_string(),
                stderr: stderr_excerpt(&out.stderr),
            }),
            Ok(Ok(_)) => match tokio::fs::metadata(&output).await {
                Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(output.clone()),
                _ => Err(DownloadError::NoOutput(output.display().to_string())),
            },
        };

        match result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Video downloaded");
                Ok(path)
            }
            Err(e) => {
                remove_partial(&output).await;
                Err(e)
            }
        }
    }
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    match text.char_indices().nth(MAX_STDERR_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

async fn remove_partial(output: &Path) {
    let mut candidates = vec![output.to_path_buf()];
    let mut part = output.as_os_str().to_owned();
    part.push(".part");
    candidates.push(PathBuf::from(part));

    for candidate in candidates {
        if let Err(e) = tokio::fs::remove_file(&candidate).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %candidate.display(), "Failed to remove partial download");
            }
        }
    }
}
