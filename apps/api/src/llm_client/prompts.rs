// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Appended to every system prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON with no markdown or extra text.";

/// Builds a system prompt from a persona line plus the JSON-only instruction.
pub fn json_system(persona: &str) -> String {
    format!("{persona} {JSON_ONLY_INSTRUCTION}")
}

/// Truncates `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder regex"))
}

/// Fills `{name}` placeholders in one pass. Substituted text is never rescanned, so
/// answers or code that contain `{...}` reach the model verbatim. Placeholders
/// without a value are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}
