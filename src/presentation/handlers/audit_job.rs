use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tokio::sync::mpsc::error::SendError;
use uuid::Uuid;

use super::audit_dto::{AuditJobAccepted, AuditJobResponse, AuditRequest, error_response};
use crate::application::services::AuditMessage;
use crate::domain::{AuditJob, AuditState, JobId};
use crate::infrastructure::observability::RequestId;
use crate::presentation::state::AppState;

const WORKER_UNAVAILABLE: &str = "audit worker unavailable: job was not queued";

#[tracing::instrument(skip(state, request_id, request))]
pub async fn submit_audit_job_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AuditRequest>,
) -> Response {
    let video_url = request.video_url.trim();
    if video_url.is_empty() {
        tracing::warn!("Audit job request with empty video_url");
        return error_response(StatusCode::BAD_REQUEST, "video_url must not be empty");
    }

    let job = AuditJob::new(video_url.to_string());
    let job_id = job.id;
    let audit_state = AuditState::new(video_url, request_id.0);
    let video_id = audit_state.video_id();
    let session_id = audit_state.session_id().to_string();

    if let Err(e) = state.job_repository.create(&job).await {
        tracing::error!(error = %e, "Failed to create audit job record");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to create job: {}", e),
        );
    }

    if let Err(SendError(mut msg)) = state
        .audit_sender
        .send(AuditMessage::tracked(job_id, audit_state))
        .await
    {
        tracing::error!(job_id = %job_id.as_uuid(), "Failed to enqueue audit job: worker channel closed");
        msg.state.fail(WORKER_UNAVAILABLE);
        if let Err(e) = state.job_repository.complete(job_id, msg.state).await {
            tracing::error!(error = %e, "Failed to settle unqueued audit job");
        }
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Audit worker unavailable");
    }

    tracing::info!(
        job_id = %job_id.as_uuid(),
        video_id = %video_id,
        "Audit job enqueued"
    );

    (
        StatusCode::ACCEPTED,
        Json(AuditJobAccepted {
            job_id: job_id.as_uuid().to_string(),
            session_id,
            video_id: video_id.to_string(),
            status: job.status.as_str().to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn audit_job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let uuid = match Uuid::parse_str(&job_id) {
        Ok(u) => u,
        Err(_) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid job ID: {}", job_id));
        }
    };

    match state.job_repository.get_by_id(JobId::from_uuid(uuid)).await {
        Ok(Some(job)) => (StatusCode::OK, Json(AuditJobResponse::from(&job))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", job_id)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch audit job");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch job: {}", e),
            )
        }
    }
}
