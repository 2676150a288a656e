//! Validation boundary for raw model output.
//!
//! The model is an untrusted text source: everything it returns goes through
//! [`parse_verdict`] before it can influence an audit.

use serde_json::{Map, Value};

use crate::domain::{Finding, Severity, Verdict, VerdictStatus};

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("output is not valid json: {0}")]
    InvalidJson(String),
    #[error("output is not a json object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("field `{field}` {problem}")]
    InvalidField { field: String, problem: String },
}

impl ParseError {
    fn invalid(field: impl Into<String>, problem: impl Into<String>) -> Self {
        ParseError::InvalidField {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

/// A verdict plus any notes about values that had to be normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVerdict {
    pub verdict: Verdict,
    pub notes: Vec<String>,
}

/// Removes a markdown code fence wrapping the whole payload, with or without a
/// language tag. Text without a fence comes back trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(idx) if is_language_tag(&rest[..idx]) => &rest[idx + 1..],
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parses and validates a verdict from raw model output.
pub fn parse_verdict(raw: &str) -> Result<ParsedVerdict, ParseError> {
    let payload = strip_code_fence(raw);
    let value = parse_object(payload)?;
    validate(value)
}

fn parse_object(payload: &str) -> Result<Map<String, Value>, ParseError> {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(err) => embedded_object(payload)
            .and_then(|inner| serde_json::from_str::<Value>(inner).ok())
            .ok_or_else(|| ParseError::InvalidJson(err.to_string()))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

// Prose around the object ("Here is the verdict: {...}") is tolerated by
// falling back to the outermost braces.
fn embedded_object(payload: &str) -> Option<&str> {
    let start = payload.find('{')?;
    let end = payload.rfind('}')?;
    (start < end).then(|| &payload[start..=end])
}

fn validate(mut object: Map<String, Value>) -> Result<ParsedVerdict, ParseError> {
    let status = match object.remove("status") {
        Some(Value::String(s)) => s
            .parse::<VerdictStatus>()
            .map_err(|_| ParseError::invalid("status", format!("must be PASS or FAIL, got {:?}", s)))?,
        Some(Value::Null) | None => return Err(ParseError::MissingField("status".to_string())),
        Some(_) => return Err(ParseError::invalid("status", "must be a string")),
    };

    let summary = match object.remove("summary") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => return Err(ParseError::MissingField("summary".to_string())),
        Some(_) => return Err(ParseError::invalid("summary", "must be a string")),
    };

    let results = match object.remove("compliance_results") {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => {
            return Err(ParseError::MissingField("compliance_results".to_string()));
        }
        Some(_) => return Err(ParseError::invalid("compliance_results", "must be an array")),
    };

    let mut notes = Vec::new();
    let findings = results
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_finding(index, item, &mut notes))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedVerdict {
        verdict: Verdict {
            status,
            findings,
            summary,
        },
        notes,
    })
}

fn parse_finding(index: usize, item: Value, notes: &mut Vec<String>) -> Result<Finding, ParseError> {
    let field = |name: &str| format!("compliance_results[{}].{}", index, name);

    let Value::Object(mut object) = item else {
        return Err(ParseError::invalid(
            format!("compliance_results[{}]", index),
            "must be an object",
        ));
    };

    let category = required_text(&mut object, &field("category"), "category")?;
    let description = required_text(&mut object, &field("description"), "description")?;
    let severity = parse_severity(object.remove("severity"), &field("severity"), notes)?;

    let timestamp = match object.remove("timestamp") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(_) => return Err(ParseError::invalid(field("timestamp"), "must be a string or number")),
    };

    Ok(Finding {
        category,
        description,
        severity,
        timestamp,
    })
}

// Anything present but unrecognized degrades to WARNING with a note; only an
// absent severity rejects the finding.
fn parse_severity(
    value: Option<Value>,
    path: &str,
    notes: &mut Vec<String>,
) -> Result<Severity, ParseError> {
    let raw = match value {
        Some(Value::Null) | None => return Err(ParseError::MissingField(path.to_string())),
        Some(Value::String(s)) => match s.parse::<Severity>() {
            Ok(severity) => return Ok(severity),
            Err(_) => format!("{:?}", s),
        },
        Some(other) => other.to_string(),
    };

    notes.push(format!(
        "note: unrecognized severity {} in {} mapped to {}",
        raw,
        path,
        Severity::Warning
    ));
    Ok(Severity::Warning)
}

fn required_text(
    object: &mut Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<String, ParseError> {
    match object.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(ParseError::invalid(path, "must not be empty")),
        Some(Value::Null) | None => Err(ParseError::MissingField(path.to_string())),
        Some(_) => Err(ParseError::invalid(path, "must be a string")),
    }
}

/// First `max_chars` characters of `raw` for diagnostics; never empty.
pub fn excerpt(raw: &str, max_chars: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
