//! HTTP error types and server error-body formatting.

use reqwest::StatusCode;
use thiserror::Error;

/// Format a failed response for display, extracting the message from a JSON body if present.
///
/// Both services answer failures with bodies shaped like
/// `{"error": {"code": "...", "message": "..."}}`:
/// - `403` + `{"error": {"code": "Forbidden", "message": "..."}}` → `HTTP 403: ... (code: Forbidden)`
/// - `401` + `{"message": "..."}` → `HTTP 401: ...`
/// - Plain text or empty bodies are kept as-is
#[must_use]
pub fn format_api_error(status: StatusCode, body: &str) -> String {
    let prefix = format!("HTTP {}", status.as_u16());
    let body = body.trim();

    if body.is_empty() {
        return prefix;
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(msg) = extract_error_message(&json)
    {
        return format!("{prefix}: {msg}");
    }

    format!("{prefix}: {body}")
}

/// Extract a readable message from a JSON error body.
fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    if let Some(error_obj) = json.get("error") {
        if let Some(msg) = error_obj.get("message").and_then(|v| v.as_str()) {
            let mut result = msg.to_string();

            if let Some(code) = error_obj.get("code").and_then(|v| v.as_str()) {
                result = format!("{result} (code: {code})");
            }

            return Some(result);
        }

        if let Some(msg) = error_obj.as_str() {
            return Some(msg.to_string());
        }
    }

    json.get("message")
        .and_then(|v| v.as_str())
        .map(ToString::to_string)
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}
