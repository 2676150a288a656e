use std::io;
use std::path::{Path, PathBuf};

/// A downloaded media file owned by one extraction run.
///
/// Call [`LocalArtifact::release`] on the normal path; `Drop` removes the
/// file if the owning future is dropped first.
#[derive(Debug)]
pub struct LocalArtifact {
    path: PathBuf,
    armed: bool,
}

impl LocalArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn release(mut self) {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Local artifact removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove local artifact"
            ),
        }
    }
}

impl Drop for LocalArtifact {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Only reached when the owning future was dropped before `release`.
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove local artifact on drop"
                );
            }
        }
    }
}
