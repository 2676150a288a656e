use vigil::infrastructure::observability::sanitize_prompt;

#[test]
fn given_blank_text_when_sanitizing_then_returns_placeholder() {
    assert_eq!(sanitize_prompt("  \n"), "[EMPTY]");
}

#[test]
fn given_short_text_when_sanitizing_then_returns_trimmed_text() {
    assert_eq!(sanitize_prompt("  Buy now!  "), "Buy now!");
}

#[test]
fn given_long_transcript_when_sanitizing_then_truncates_and_reports_length() {
    let transcript = "word ".repeat(100);

    let sanitized = sanitize_prompt(&transcript);

    assert!(sanitized.contains("... (499 chars total)"));
}

#[test]
fn given_multibyte_text_when_sanitizing_then_does_not_split_characters() {
    let text = "é".repeat(150);

    let sanitized = sanitize_prompt(&text);

    assert!(sanitized.starts_with(&"é".repeat(100)));
    assert!(sanitized.contains("(150 chars total)"));
}

#[test]
fn given_bearer_token_when_sanitizing_then_redacts_it() {
    let sanitized = sanitize_prompt("Authorization: Bearer sk-live-123 end");

    assert_eq!(sanitized, "Authorization: Bearer [REDACTED] end");
}

#[test]
fn given_repeated_access_tokens_when_sanitizing_then_redacts_each() {
    let sanitized =
        sanitize_prompt("GET /Index?accessToken=abc&x=1 then /Index?accessToken=def");

    assert!(!sanitized.contains("abc"));
    assert!(!sanitized.contains("def"));
    assert_eq!(sanitized.matches("[REDACTED]").count(), 2);
}
