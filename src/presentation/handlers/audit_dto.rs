use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::{AuditJob, AuditState, Finding};

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub video_url: String,
}

#[derive(Debug, Serialize)]
pub struct FindingDto {
    pub category: String,
    pub severity: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl From<&Finding> for FindingDto {
    fn from(finding: &Finding) -> Self {
        Self {
            category: finding.category.clone(),
            severity: finding.severity.as_str().to_string(),
            description: finding.description.clone(),
            timestamp: finding.timestamp.clone(),
        }
    }
}

/// Wire shape of a finished audit.
///
/// `final_report` is the model summary, or the last diagnostic when the run
/// failed before a verdict was produced.
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub session_id: String,
    pub video_id: String,
    pub status: String,
    pub final_report: Option<String>,
    pub compliance_results: Vec<FindingDto>,
}

impl From<&AuditState> for AuditResponse {
    fn from(state: &AuditState) -> Self {
        let final_report = state
            .final_report()
            .map(str::to_string)
            .or_else(|| state.diagnostics().last().cloned());

        Self {
            session_id: state.session_id().to_string(),
            video_id: state.video_id().to_string(),
            status: state.final_status().as_str().to_string(),
            final_report,
            compliance_results: state
                .compliance_findings()
                .iter()
                .map(FindingDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditJobAccepted {
    pub job_id: String,
    pub session_id: String,
    pub video_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct AuditJobResponse {
    pub job_id: String,
    pub video_url: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AuditResponse>,
}

impl From<&AuditJob> for AuditJobResponse {
    fn from(job: &AuditJob) -> Self {
        Self {
            job_id: job.id.as_uuid().to_string(),
            video_url: job.video_url.clone(),
            status: job.status.as_str().to_string(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            result: job.result.as_ref().map(AuditResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}
