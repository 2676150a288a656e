use std::fmt::Write;

pub const SYSTEM_INSTRUCTION: &str = "\
You are a senior brand-compliance auditor reviewing a marketing video.
Judge the video evidence strictly against the policy context below. Flag
unsubstantiated claims, missing disclosures and any other policy violation.

Respond with ONLY a JSON object, no prose before or after it, in exactly this shape:
{
  \"status\": \"PASS\" or \"FAIL\",
  \"compliance_results\": [
    {
      \"category\": \"short classification, e.g. Claim Validation or Disclosure\",
      \"severity\": \"CRITICAL\" or \"WARNING\",
      \"description\": \"what is wrong and why\",
      \"timestamp\": \"optional position in the video\"
    }
  ],
  \"summary\": \"one paragraph explaining the verdict\"
}
Use FAIL whenever at least one issue is found and list every issue in compliance_results.
Use PASS with an empty compliance_results array when the video is compliant.";

const NO_CONTEXT: &str = "No policy passages were retrieved for this video.";
const NO_ON_SCREEN_TEXT: &str = "(none detected)";

/// Transcript followed by on-screen text, cut to `max_chars` characters.
pub fn build_query(transcript: &str, on_screen_text: &[String], max_chars: usize) -> String {
    let mut query = transcript.trim().to_string();
    for line in on_screen_text.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        query.push('\n');
        query.push_str(line);
    }
    truncate_chars(&query, max_chars).to_string()
}

/// Assembles the single instruction block sent to the model.
///
/// The policy context and the evidence are each cut to `max_section_chars`.
pub fn build_prompt(
    fragments: &[String],
    transcript: &str,
    on_screen_text: &[String],
    max_section_chars: usize,
) -> String {
    let context = if fragments.is_empty() {
        NO_CONTEXT.to_string()
    } else {
        fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| format!("[{}] {}", i + 1, fragment))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let ocr = if on_screen_text.is_empty() {
        NO_ON_SCREEN_TEXT.to_string()
    } else {
        on_screen_text.join("\n")
    };

    let mut prompt = String::with_capacity(SYSTEM_INSTRUCTION.len() + context.len() + transcript.len());
    prompt.push_str(SYSTEM_INSTRUCTION);
    let _ = write!(
        prompt,
        "\n\n### POLICY CONTEXT\n{}\n\n### VIDEO TRANSCRIPT\n{}\n\n### ON-SCREEN TEXT\n{}\n",
        truncate_chars(&context, max_section_chars),
        truncate_chars(transcript, max_section_chars),
        truncate_chars(&ocr, max_section_chars),
    );
    prompt
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
