use vigil::domain::{AuditState, FinalStatus, Finding, Severity, Verdict, VerdictStatus};

fn fail_verdict() -> Verdict {
    Verdict {
        status: VerdictStatus::Fail,
        findings: vec![Finding::new(
            "Disclosure".to_string(),
            "Missing sponsorship disclosure".to_string(),
            Severity::Critical,
        )],
        summary: "Sponsored content without disclosure.".to_string(),
    }
}

#[test]
fn given_new_state_when_created_then_pending_and_empty() {
    let state = AuditState::new("https://youtu.be/abc", "session-1");

    assert_eq!(state.final_status(), FinalStatus::Pending);
    assert!(!state.is_settled());
    assert!(state.compliance_findings().is_empty());
    assert!(state.diagnostics().is_empty());
    assert!(state.final_report().is_none());
    assert!(state.evidence.is_none());
    assert!(state.local_artifact_path.is_none());
    assert_eq!(state.session_id(), "session-1");
}

#[test]
fn given_same_reference_when_creating_two_states_then_ids_differ() {
    let first = AuditState::new("https://youtu.be/abc", "s");
    let second = AuditState::new("https://youtu.be/abc", "s");

    assert_ne!(first.video_id(), second.video_id());
}

#[test]
fn given_pending_state_when_concluding_then_records_verdict() {
    let mut state = AuditState::new("https://youtu.be/abc", "s");

    assert!(state.conclude(fail_verdict()));

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert_eq!(state.compliance_findings().len(), 1);
    assert_eq!(
        state.final_report(),
        Some("Sponsored content without disclosure.")
    );
}

#[test]
fn given_failed_state_when_concluding_then_verdict_is_ignored() {
    let mut state = AuditState::new("https://youtu.be/abc", "s");
    state.fail("download failed");

    assert!(!state.conclude(Verdict {
        status: VerdictStatus::Pass,
        findings: Vec::new(),
        summary: "fine".to_string(),
    }));

    assert_eq!(state.final_status(), FinalStatus::Fail);
    assert!(state.final_report().is_none());
}

#[test]
fn given_passed_state_when_failing_then_status_stays_and_diagnostic_is_kept() {
    let mut state = AuditState::new("https://youtu.be/abc", "s");
    state.conclude(Verdict {
        status: VerdictStatus::Pass,
        findings: Vec::new(),
        summary: "fine".to_string(),
    });

    assert!(!state.fail("late failure"));

    assert_eq!(state.final_status(), FinalStatus::Pass);
    assert_eq!(state.diagnostics(), ["late failure".to_string()]);
}

#[test]
fn given_note_when_added_then_status_is_untouched() {
    let mut state = AuditState::new("https://youtu.be/abc", "s");

    state.note("severity mapped");

    assert_eq!(state.final_status(), FinalStatus::Pending);
    assert_eq!(state.diagnostics().len(), 1);
}

#[test]
fn given_final_status_when_displayed_then_uses_wire_names() {
    assert_eq!(FinalStatus::Pending.to_string(), "PENDING");
    assert_eq!(FinalStatus::Pass.to_string(), "PASS");
    assert_eq!(FinalStatus::from(VerdictStatus::Fail), FinalStatus::Fail);
}
