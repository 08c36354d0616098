//! # Response decoding helpers
//!
//! Strict JSON decoding for API response bodies. Failures carry the HTTP
//! status and a truncated body preview so a malformed envelope can be
//! diagnosed from the error alone.

use serde::de::DeserializeOwned;
use spotinst_types::Envelope;
use thiserror::Error;

/// Longest body preview kept in a [`JsonParseError`].
const PREVIEW_LIMIT: usize = 200;

/// Decode `text` as `T`, decorating failures with status and body preview.
///
/// # Arguments
/// * `text` - The raw response body
/// * `status` - HTTP status code of the response, when known
///
/// # Errors
/// Returns a [`JsonParseError`] holding the serde error, the status and up to
/// 200 characters of the body with whitespace runs collapsed.
pub fn decode_json_strict<T: DeserializeOwned>(text: &str, status: Option<u16>) -> Result<T, JsonParseError> {
    serde_json::from_str::<T>(text).map_err(|source| JsonParseError {
        status,
        source,
        body_preview: truncate_response_preview(text, PREVIEW_LIMIT),
    })
}

/// Decode a response body into its [`Envelope`]. An empty body decodes to an
/// empty envelope.
///
/// ```rust
/// use spotinst_util::http::decode_envelope;
///
/// let envelope = decode_envelope(r#"{"response":{"items":[{"id":"sig-1"}],"count":1}}"#, Some(200)).unwrap();
/// assert_eq!(envelope.response.count, 1);
///
/// assert!(decode_envelope("  ", Some(204)).unwrap().response.items.is_empty());
/// assert!(decode_envelope("<html>", Some(502)).is_err());
/// ```
pub fn decode_envelope(text: &str, status: Option<u16>) -> Result<Envelope, JsonParseError> {
    if text.trim().is_empty() {
        return Ok(Envelope::default());
    }
    decode_json_strict(text, status)
}

/// Collapse whitespace runs to single spaces and keep at most `limit`
/// characters, marking a cut with `...`. Blank input renders as `<empty>`.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "<empty>".to_string();
    }
    match collapsed.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &collapsed[..cut]),
        None => collapsed,
    }
}

/// Strict decoding of a response body failed.
#[derive(Debug, Error)]
#[error("failed to decode response body ({}): {source}. body preview: {body_preview}", status_note(.status))]
pub struct JsonParseError {
    status: Option<u16>,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    /// HTTP status of the response whose body failed to decode.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Collapsed, truncated copy of the offending body.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }

    /// The underlying serde error, also reachable through
    /// [`std::error::Error::source`].
    pub fn serde_error(&self) -> &serde_json::Error {
        &self.source
    }
}

fn status_note(status: &Option<u16>) -> String {
    status
        .map(|code| format!("status {code}"))
        .unwrap_or_else(|| "unknown status".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn parse_failure_reports_status_and_collapsed_preview() {
        let error = decode_json_strict::<Value>("{\n\t\"response\": ", Some(500)).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("status 500"), "{message}");
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.body_preview(), "{ \"response\":");
        assert!(error.serde_error().is_eof());
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn preview_is_truncated_with_ellipsis() {
        let long_body = "x".repeat(500);
        let preview = truncate_response_preview(&long_body, 10);
        assert_eq!(preview, "xxxxxxxxxx...");
        assert_eq!(truncate_response_preview(" \n", 10), "<empty>");
        assert_eq!(truncate_response_preview("héllo  wörld", 7), "héllo w...");
    }

    #[test]
    fn unknown_status_is_noted() {
        let error = decode_envelope("nope", None).unwrap_err();
        assert!(error.to_string().contains("unknown status"));
    }
}
