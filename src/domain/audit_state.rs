use std::fmt;
use std::path::PathBuf;

use super::{Evidence, Finding, Verdict, VerdictStatus, VideoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinalStatus {
    Pending,
    Pass,
    Fail,
}

impl FinalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalStatus::Pending => "PENDING",
            FinalStatus::Pass => "PASS",
            FinalStatus::Fail => "FAIL",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, FinalStatus::Pending)
    }
}

impl From<VerdictStatus> for FinalStatus {
    fn from(status: VerdictStatus) -> Self {
        match status {
            VerdictStatus::Pass => FinalStatus::Pass,
            VerdictStatus::Fail => FinalStatus::Fail,
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The record threaded through one audit run.
///
/// Owned by exactly one stage at a time. `final_status` leaves `Pending`
/// at most once; the settling methods ignore later attempts.
#[derive(Debug, Clone)]
pub struct AuditState {
    video_reference: String,
    video_id: VideoId,
    session_id: String,
    pub local_artifact_path: Option<PathBuf>,
    pub evidence: Option<Evidence>,
    pub retrieved_context: Vec<String>,
    compliance_findings: Vec<Finding>,
    final_status: FinalStatus,
    final_report: Option<String>,
    diagnostics: Vec<String>,
}

impl AuditState {
    pub fn new(video_reference: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            video_reference: video_reference.into(),
            video_id: VideoId::new(),
            session_id: session_id.into(),
            local_artifact_path: None,
            evidence: None,
            retrieved_context: Vec::new(),
            compliance_findings: Vec::new(),
            final_status: FinalStatus::Pending,
            final_report: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn video_reference(&self) -> &str {
        &self.video_reference
    }

    pub fn video_id(&self) -> VideoId {
        self.video_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn compliance_findings(&self) -> &[Finding] {
        &self.compliance_findings
    }

    pub fn final_status(&self) -> FinalStatus {
        self.final_status
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn is_settled(&self) -> bool {
        self.final_status.is_terminal()
    }

    /// Appends a diagnostic without touching the status.
    pub fn note(&mut self, diagnostic: impl Into<String>) {
        self.diagnostics.push(diagnostic.into());
    }

    /// Records a terminal failure. Returns `false` if the run was already settled.
    pub fn fail(&mut self, diagnostic: impl Into<String>) -> bool {
        self.diagnostics.push(diagnostic.into());
        if self.is_settled() {
            tracing::warn!(
                video_id = %self.video_id,
                status = %self.final_status,
                "Ignoring failure on an already settled audit"
            );
            return false;
        }
        self.final_status = FinalStatus::Fail;
        true
    }

    /// Records the model verdict. Returns `false` if the run was already settled.
    pub fn conclude(&mut self, verdict: Verdict) -> bool {
        if self.is_settled() {
            tracing::warn!(
                video_id = %self.video_id,
                status = %self.final_status,
                "Ignoring verdict on an already settled audit"
            );
            return false;
        }
        self.final_status = verdict.status.into();
        self.compliance_findings = verdict.findings;
        self.final_report = Some(verdict.summary);
        true
    }
}
