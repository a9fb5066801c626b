use serde::de::DeserializeOwned;

use crate::error::AiError;

/// Removes a surrounding Markdown code fence (with or without a language tag).
#[must_use]
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    match body.split_once('\n') {
        Some((tag, inner)) if !tag.trim().contains(char::is_whitespace) => inner.trim(),
        _ => body.trim(),
    }
}

/// Parses a model reply as JSON, tolerating a fenced block around it.
///
/// # Errors
///
/// Returns `AiError::InvalidJson` if the payload does not deserialize into `T`.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T, AiError> {
    Ok(serde_json::from_str(strip_code_fence(reply))?)
}
