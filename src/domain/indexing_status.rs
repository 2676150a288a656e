use std::fmt;

/// Remote job state reported by the media indexing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexingStatus {
    Pending,
    Processed,
    Failed,
}

impl IndexingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexingStatus::Pending => "PENDING",
            IndexingStatus::Processed => "PROCESSED",
            IndexingStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for IndexingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle to a submitted indexing job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexingJob(String);

impl IndexingJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexingJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
