use std::sync::Arc;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{LlmClient, PolicyRetriever};
use crate::domain::{AuditState, Verdict, VerdictStatus};

use super::AuditError;
use super::audit_prompt::{build_prompt, build_query};
use super::cancellation::until_cancelled;
use super::response_parser::{ParseError, ParsedVerdict, excerpt, parse_verdict};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MAX_QUERY_CHARS: usize = 2_000;
pub const DEFAULT_MAX_SECTION_CHARS: usize = 12_000;
pub const DEFAULT_MAX_EXCERPT_CHARS: usize = 200;

/// Whether a model `FAIL` verdict that lists no findings is accepted as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailWithoutFindings {
    #[default]
    Accept,
    Reject,
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub top_k: usize,
    pub max_query_chars: usize,
    pub max_section_chars: usize,
    pub max_excerpt_chars: usize,
    pub fail_without_findings: FailWithoutFindings,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
            max_section_chars: DEFAULT_MAX_SECTION_CHARS,
            max_excerpt_chars: DEFAULT_MAX_EXCERPT_CHARS,
            fail_without_findings: FailWithoutFindings::default(),
        }
    }
}

/// Retrieval-augmented verdict generation over extracted evidence.
pub struct AuditStage {
    retriever: Arc<dyn PolicyRetriever>,
    llm_client: Arc<dyn LlmClient>,
    config: AuditConfig,
}

impl AuditStage {
    pub fn new(
        retriever: Arc<dyn PolicyRetriever>,
        llm_client: Arc<dyn LlmClient>,
        config: AuditConfig,
    ) -> Self {
        Self {
            retriever,
            llm_client,
            config,
        }
    }

    pub async fn run(&self, mut state: AuditState, cancel: &CancellationToken) -> AuditState {
        match self.audit(&mut state, cancel).await {
            Ok(parsed) => {
                for note in parsed.notes {
                    state.note(note);
                }
                tracing::info!(
                    status = %parsed.verdict.status,
                    findings = parsed.verdict.findings.len(),
                    "Verdict recorded"
                );
                state.conclude(parsed.verdict);
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Audit failed");
                state.fail(e.to_string());
            }
        }
        state
    }

    async fn audit(
        &self,
        state: &mut AuditState,
        cancel: &CancellationToken,
    ) -> Result<ParsedVerdict, AuditError> {
        let evidence = state.evidence.as_ref().ok_or(AuditError::EvidenceMissing)?;
        let transcript = evidence
            .usable_transcript()
            .ok_or(AuditError::EvidenceMissing)?
            .to_string();
        let on_screen_text = evidence.on_screen_text.clone();

        let query = build_query(&transcript, &on_screen_text, self.config.max_query_chars);
        tracing::debug!(query_chars = query.chars().count(), "Retrieving policy context");

        let fragments = until_cancelled(
            cancel,
            "retrieval",
            self.retriever.query(&query, self.config.top_k),
        )
        .await?
        .map_err(AuditError::Retrieval)?;

        tracing::info!(fragments = fragments.len(), "Policy context retrieved");
        state.retrieved_context = fragments;

        let prompt = build_prompt(
            &state.retrieved_context,
            &transcript,
            &on_screen_text,
            self.config.max_section_chars,
        );

        let raw = until_cancelled(cancel, "generation", self.llm_client.complete(&prompt))
            .await?
            .map_err(AuditError::Generation)?;

        tracing::debug!(output_chars = raw.chars().count(), "Model output received");

        let parsed = parse_verdict(&raw).map_err(|cause| self.malformed(cause, &raw))?;
        self.check_policy(&parsed.verdict, &raw)?;
        Ok(parsed)
    }

    fn check_policy(&self, verdict: &Verdict, raw: &str) -> Result<(), AuditError> {
        let rejects = self.config.fail_without_findings == FailWithoutFindings::Reject
            && verdict.status == VerdictStatus::Fail
            && verdict.findings.is_empty();

        if rejects {
            return Err(self.malformed(
                ParseError::InvalidField {
                    field: "compliance_results".to_string(),
                    problem: "must not be empty when status is FAIL".to_string(),
                },
                raw,
            ));
        }
        Ok(())
    }

    fn malformed(&self, cause: ParseError, raw: &str) -> AuditError {
        AuditError::MalformedOutput {
            cause,
            excerpt: excerpt(raw, self.config.max_excerpt_chars),
        }
    }
}
