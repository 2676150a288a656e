use std::time::Duration;

use vigil::application::services::FailWithoutFindings;
use vigil::presentation::Environment;
use vigil::presentation::config::{AuditSettings, LlmProvider, Settings};

#[test]
fn given_no_configuration_when_defaulting_then_audit_limits_match_documented_values() {
    let settings = Settings::default();

    assert_eq!(settings.audit.poll_interval_seconds, 30);
    assert_eq!(settings.audit.max_poll_attempts, 60);
    assert_eq!(settings.audit.max_wait_seconds, 1_800);
    assert_eq!(settings.audit.top_k, 5);
    assert_eq!(settings.audit.max_excerpt_chars, 200);
    assert_eq!(settings.audit.max_concurrent_audits, 4);
    assert_eq!(settings.audit.fail_without_findings, FailWithoutFindings::Accept);
    assert_eq!(settings.server.service_name, "vigil");
    assert_eq!(settings.audit.run_timeout(), Duration::from_secs(45 * 60));
    assert_eq!(settings.audit.job_retention(), Duration::from_secs(60 * 60));
    assert_eq!(settings.llm.request_timeout_seconds, 120);
}

#[test]
fn given_audit_settings_when_deriving_stage_configs_then_durations_are_converted() {
    let audit = AuditSettings {
        poll_interval_seconds: 5,
        max_wait_seconds: 120,
        top_k: 3,
        fail_without_findings: FailWithoutFindings::Reject,
        ..AuditSettings::default()
    };

    let extraction = audit.extraction_config();
    let config = audit.audit_config();

    assert_eq!(extraction.poll_interval, Duration::from_secs(5));
    assert_eq!(extraction.max_wait, Duration::from_secs(120));
    assert!(extraction.accepted_hosts.contains(&"youtu.be".to_string()));
    assert_eq!(config.top_k, 3);
    assert_eq!(config.fail_without_findings, FailWithoutFindings::Reject);
}

#[test]
fn given_partial_json_when_deserializing_then_missing_keys_use_defaults() {
    let settings: Settings = serde_json::from_str(
        r#"{"audit":{"fail_without_findings":"reject","top_k":8,"max_section_chars":500},"llm":{"provider":"lmstudio"}}"#,
    )
    .unwrap();

    assert_eq!(settings.audit.fail_without_findings, FailWithoutFindings::Reject);
    assert_eq!(settings.audit.top_k, 8);
    assert_eq!(settings.audit.audit_config().max_section_chars, 500);
    assert_eq!(settings.audit.max_poll_attempts, 60);
    assert_eq!(settings.llm.provider, LlmProvider::LmStudio);
}

#[test]
fn given_environment_names_when_parsing_then_accepts_known_values() {
    assert_eq!(
        Environment::try_from("PROD".to_string()),
        Ok(Environment::Prod)
    );
    assert_eq!(
        Environment::try_from("production".to_string()),
        Ok(Environment::Prod)
    );
    assert!(Environment::try_from("staging".to_string()).is_err());
    assert_eq!(Environment::Test.file_suffix(), "test");
}
