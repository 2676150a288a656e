use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::domain::AuditState;

use super::{AuditStage, ExtractionStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Extracting,
    Auditing,
}

impl WorkflowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Extracting => "extracting",
            WorkflowPhase::Auditing => "auditing",
        }
    }
}

/// Runs extraction then audit, stopping at the first terminal outcome.
pub struct WorkflowEngine {
    extraction: ExtractionStage,
    audit: AuditStage,
}

impl WorkflowEngine {
    pub fn new(extraction: ExtractionStage, audit: AuditStage) -> Self {
        Self { extraction, audit }
    }

    pub async fn run(&self, state: AuditState, cancel: &CancellationToken) -> AuditState {
        let span = tracing::info_span!(
            "audit_run",
            video_id = %state.video_id(),
            session_id = %state.session_id(),
        );
        self.sequence(state, cancel).instrument(span).await
    }

    async fn sequence(&self, state: AuditState, cancel: &CancellationToken) -> AuditState {
        tracing::info!(phase = WorkflowPhase::Extracting.as_str(), "Audit phase started");
        let state = self.extraction.run(state, cancel).await;

        if state.is_settled() {
            tracing::info!(status = %state.final_status(), "Audit stopped after extraction");
            return state;
        }

        tracing::info!(phase = WorkflowPhase::Auditing.as_str(), "Audit phase started");
        let state = self.audit.run(state, cancel).await;

        if state.is_settled() {
            tracing::info!(status = %state.final_status(), "Audit finished");
        } else {
            tracing::error!("Audit stages returned without settling the run");
        }
        state
    }
}
