use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tokio_util::sync::CancellationToken;

use super::audit_dto::{AuditRequest, AuditResponse, error_response};
use crate::application::services::AuditMessage;
use crate::domain::AuditState;
use crate::infrastructure::observability::{RequestId, sanitize_prompt};
use crate::presentation::state::AppState;

/// Runs an audit on the worker and waits for the verdict.
#[tracing::instrument(skip(state, request_id, request))]
pub async fn audit_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AuditRequest>,
) -> Response {
    let video_url = request.video_url.trim();
    if video_url.is_empty() {
        tracing::warn!("Audit request with empty video_url");
        return error_response(StatusCode::BAD_REQUEST, "video_url must not be empty");
    }

    tracing::debug!(video_url = %sanitize_prompt(video_url), "Processing audit request");

    let audit_state = AuditState::new(video_url, request_id.0);
    let video_id = audit_state.video_id();
    let cancel = CancellationToken::new();
    let _cancel_on_exit = cancel.clone().drop_guard();

    let (msg, receiver) = AuditMessage::awaited(audit_state, cancel.clone());

    if let Err(e) = state.audit_sender.send(msg).await {
        tracing::error!(error = %e, "Failed to enqueue audit: worker channel closed");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Audit worker unavailable");
    }

    let run_timeout = state.settings.audit.run_timeout();
    match tokio::time::timeout(run_timeout, receiver).await {
        Ok(Ok(final_state)) => {
            tracing::info!(
                video_id = %video_id,
                status = %final_state.final_status(),
                findings = final_state.compliance_findings().len(),
                "Audit completed"
            );
            (StatusCode::OK, Json(AuditResponse::from(&final_state))).into_response()
        }
        Ok(Err(_)) => {
            tracing::error!(video_id = %video_id, "Audit worker dropped the run");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Audit worker stopped before producing a result",
            )
        }
        Err(_) => {
            tracing::warn!(video_id = %video_id, timeout = ?run_timeout, "Audit run timed out");
            cancel.cancel();
            error_response(
                StatusCode::GATEWAY_TIMEOUT,
                format!("Audit did not finish within {}s", run_timeout.as_secs()),
            )
        }
    }
}
