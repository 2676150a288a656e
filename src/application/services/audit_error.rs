use crate::application::ports::{DownloadError, LlmClientError, RetrievalError};
use crate::domain::VideoReferenceError;

use super::response_parser::ParseError;

/// Job label used in diagnostics when the indexing service never issued a job id.
pub const UNSUBMITTED_JOB: &str = "<unsubmitted>";

/// Terminal failures of an audit run. The `Display` text becomes the run's diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("invalid video reference: {0}")]
    InputShape(#[from] VideoReferenceError),
    #[error("media acquisition failed: {0}")]
    Acquisition(DownloadError),
    #[error("extraction timeout on job {job}: {reason}")]
    ExtractionTimeout { job: String, reason: String },
    #[error("extraction service failed on job {job}: {reason}")]
    ExtractionService { job: String, reason: String },
    #[error("no transcript available")]
    EvidenceMissing,
    #[error("policy retrieval failed: {0}")]
    Retrieval(RetrievalError),
    #[error("verdict generation failed: {0}")]
    Generation(LlmClientError),
    #[error("malformed model output: {cause}; raw output excerpt: {excerpt}")]
    MalformedOutput { cause: ParseError, excerpt: String },
    #[error("audit cancelled during {0}")]
    Cancelled(&'static str),
}

impl AuditError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::InputShape(_) => "input_shape",
            AuditError::Acquisition(_) => "acquisition",
            AuditError::ExtractionTimeout { .. } => "extraction_timeout",
            AuditError::ExtractionService { .. } => "extraction_service",
            AuditError::EvidenceMissing => "evidence_missing",
            AuditError::Retrieval(_) => "retrieval",
            AuditError::Generation(_) => "generation",
            AuditError::MalformedOutput { .. } => "malformed_output",
            AuditError::Cancelled(_) => "cancelled",
        }
    }
}
