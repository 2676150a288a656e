use std::fmt;

use chrono::{DateTime, Utc};

use super::{AuditState, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditJobStatus {
    Queued,
    Running,
    Completed,
}

impl AuditJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditJobStatus::Queued => "QUEUED",
            AuditJobStatus::Running => "RUNNING",
            AuditJobStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for AuditJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AuditJob {
    pub id: JobId,
    pub video_url: String,
    pub status: AuditJobStatus,
    pub result: Option<AuditState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuditJob {
    pub fn new(video_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            video_url,
            status: AuditJobStatus::Queued,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }
}
