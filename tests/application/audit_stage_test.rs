use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vigil::application::services::{AuditConfig, AuditStage, FailWithoutFindings};
use vigil::domain::{AuditState, Evidence, FinalStatus, Severity};

use crate::helpers::{
    FENCED_FAIL_VERDICT, MockLlmClient, MockRetriever, PASS_VERDICT, VALID_URL,
    transcript_evidence,
};

const DISCLOSURE_FRAGMENT: &str =
    "Performance claims such as guaranteed results must be substantiated and disclosed.";

fn state_with(evidence: Evidence) -> AuditState {
    let mut state = AuditState::new(VALID_URL, "session-1");
    state.evidence = Some(evidence);
    state
}

fn stage(
    retriever: &Arc<MockRetriever>,
    llm: &Arc<MockLlmClient>,
    config: AuditConfig,
) -> AuditStage {
    AuditStage::new(retriever.clone(), llm.clone(), config)
}

#[tokio::test]
async fn given_guaranteed_results_claim_when_auditing_then_fails_with_one_finding() {
    let retriever = Arc::new(MockRetriever::returning(vec![DISCLOSURE_FRAGMENT]));
    let llm = Arc::new(MockLlmClient::replying(FENCED_FAIL_VERDICT));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(
            state_with(transcript_evidence("Buy now, guaranteed results!")),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert_eq!(state.compliance_findings().len(), 1);
    assert_eq!(state.compliance_findings()[0].severity, Severity::Critical);
    assert_eq!(
        state.final_report(),
        Some("The video makes an absolute performance claim without the required disclosure.")
    );
    assert_eq!(state.retrieved_context, vec![DISCLOSURE_FRAGMENT.to_string()]);
    assert!(state.diagnostics().is_empty());
    assert_eq!(llm.calls(), 1);

    let prompt = llm.last_prompt();
    assert!(prompt.contains(DISCLOSURE_FRAGMENT));
    assert!(prompt.contains("Buy now, guaranteed results!"));
}

#[tokio::test]
async fn given_empty_transcript_when_auditing_then_fails_without_retrieval_or_generation() {
    let retriever = Arc::new(MockRetriever::returning(vec![DISCLOSURE_FRAGMENT]));
    let llm = Arc::new(MockLlmClient::replying(PASS_VERDICT));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(state_with(transcript_evidence("")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert_eq!(state.diagnostics(), ["no transcript available".to_string()]);
    assert!(state.compliance_findings().is_empty());
    assert_eq!(retriever.calls(), 0);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_missing_evidence_when_auditing_then_fails_with_no_transcript() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(PASS_VERDICT));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(AuditState::new(VALID_URL, "s"), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert_eq!(state.diagnostics(), ["no transcript available".to_string()]);
    assert_eq!(retriever.calls(), 0);
}

#[tokio::test]
async fn given_unfenced_lowercase_pass_when_auditing_then_passes() {
    let retriever = Arc::new(MockRetriever::returning(vec![DISCLOSURE_FRAGMENT]));
    let llm = Arc::new(MockLlmClient::replying(PASS_VERDICT));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(
            state_with(transcript_evidence("Our product, available in stores.")),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(state.final_status(), FinalStatus::Pass);
    assert!(state.compliance_findings().is_empty());
    assert_eq!(state.final_report(), Some("No compliance issues found."));
}

#[tokio::test]
async fn given_no_fragments_when_auditing_then_still_generates_verdict() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(PASS_VERDICT));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Pass);
    assert!(state.retrieved_context.is_empty());
    assert!(llm.last_prompt().contains("No policy passages were retrieved"));
}

#[tokio::test]
async fn given_ocr_text_when_auditing_then_query_includes_it_after_transcript() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(PASS_VERDICT));
    let stage = stage(&retriever, &llm, AuditConfig::default());
    let evidence = Evidence::new(Some("Buy now".to_string()), vec!["50% OFF".to_string()]);

    stage
        .run(state_with(evidence), &CancellationToken::new())
        .await;

    let query = retriever.last_query.lock().unwrap().clone().unwrap();
    assert_eq!(query, "Buy now\n50% OFF");
}

#[tokio::test]
async fn given_non_json_output_when_auditing_then_fails_with_excerpt() {
    let retriever = Arc::new(MockRetriever::returning(vec![DISCLOSURE_FRAGMENT]));
    let llm = Arc::new(MockLlmClient::replying("Sorry, I cannot help with that."));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.compliance_findings().is_empty());
    assert!(state.final_report().is_none());
    let diagnostic = &state.diagnostics()[0];
    assert!(diagnostic.contains("malformed model output"));
    assert!(diagnostic.contains("Sorry, I cannot help with that."));
}

#[tokio::test]
async fn given_missing_results_field_when_auditing_then_diagnostic_names_field() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(r#"{"status":"FAIL","summary":"bad"}"#));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.compliance_findings().is_empty());
    assert!(state.diagnostics()[0].contains("compliance_results"));
}

#[tokio::test]
async fn given_long_malformed_output_when_auditing_then_excerpt_is_truncated() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let raw = format!("{{ broken {}", "y".repeat(1_000));
    let llm = Arc::new(MockLlmClient::replying(&raw));
    let config = AuditConfig {
        max_excerpt_chars: 50,
        ..AuditConfig::default()
    };
    let stage = stage(&retriever, &llm, config);

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    let diagnostic = &state.diagnostics()[0];
    assert!(diagnostic.ends_with("..."));
    assert!(!diagnostic.contains(&"y".repeat(100)));
}

#[tokio::test]
async fn given_unknown_severity_when_auditing_then_records_warning_and_note() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(
        r#"{"status":"FAIL","compliance_results":[{"category":"Tone","severity":"HIGH","description":"Pushy"}],"summary":"Pushy tone."}"#,
    ));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert_eq!(state.compliance_findings()[0].severity, Severity::Warning);
    assert_eq!(state.diagnostics().len(), 1);
    assert!(state.diagnostics()[0].contains("HIGH"));
}

#[tokio::test]
async fn given_fail_without_findings_and_accept_policy_when_auditing_then_fail_is_kept() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(
        r#"{"status":"FAIL","compliance_results":[],"summary":"Overall misleading."}"#,
    ));
    let config = AuditConfig {
        fail_without_findings: FailWithoutFindings::Accept,
        ..AuditConfig::default()
    };
    let stage = stage(&retriever, &llm, config);

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.compliance_findings().is_empty());
    assert_eq!(state.final_report(), Some("Overall misleading."));
    assert!(state.diagnostics().is_empty());
}

#[tokio::test]
async fn given_fail_without_findings_and_reject_policy_when_auditing_then_output_is_malformed() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(
        r#"{"status":"FAIL","compliance_results":[],"summary":"Overall misleading."}"#,
    ));
    let config = AuditConfig {
        fail_without_findings: FailWithoutFindings::Reject,
        ..AuditConfig::default()
    };
    let stage = stage(&retriever, &llm, config);

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.final_report().is_none());
    assert!(state.diagnostics()[0].contains("malformed model output"));
    assert!(state.diagnostics()[0].contains("must not be empty when status is FAIL"));
}

#[tokio::test]
async fn given_reject_policy_when_model_passes_with_no_findings_then_passes() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::replying(PASS_VERDICT));
    let config = AuditConfig {
        fail_without_findings: FailWithoutFindings::Reject,
        ..AuditConfig::default()
    };
    let stage = stage(&retriever, &llm, config);

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Pass);
}

#[tokio::test]
async fn given_retrieval_error_when_auditing_then_fails_without_generation() {
    let retriever = Arc::new(MockRetriever::failing());
    let llm = Arc::new(MockLlmClient::replying(PASS_VERDICT));
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.diagnostics()[0].contains("policy retrieval failed"));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_generation_error_when_auditing_then_fails() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::failing());
    let stage = stage(&retriever, &llm, AuditConfig::default());

    let state = stage
        .run(state_with(transcript_evidence("hello")), &CancellationToken::new())
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.diagnostics()[0].contains("verdict generation failed"));
}

#[tokio::test(start_paused = true)]
async fn given_hanging_generation_when_cancelled_then_fails_as_cancelled() {
    let retriever = Arc::new(MockRetriever::returning(Vec::new()));
    let llm = Arc::new(MockLlmClient::hanging());
    let stage = stage(&retriever, &llm, AuditConfig::default());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        trigger.cancel();
    });

    let state = stage
        .run(state_with(transcript_evidence("hello")), &cancel)
        .await;

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.diagnostics()[0].contains("cancelled during generation"));
    assert_eq!(llm.calls(), 1);
}
