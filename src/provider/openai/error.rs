use std::time::Duration;

use serde::Deserialize;

use crate::error::UnifyError;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Classifies a non-2xx chat-completions reply into the shared error type.
///
/// The body is the standard `{"error": {...}}` envelope; anything else falls
/// back to the raw text so callers still see what the backend said.
pub(crate) fn parse_openai_error(
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> UnifyError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let detail = envelope.error;
            let mut message = detail.message.unwrap_or_else(|| "unknown error".to_string());
            if let Some(kind) = detail.kind {
                message = format!("{message} (type: {kind})");
            }
            if let Some(code) = detail.code {
                message = format!("{message} (code: {code})");
            }
            message
        }
        Err(_) => format!("status {status}: {body}"),
    };

    match status {
        401 | 403 => UnifyError::Auth { message },
        429 => UnifyError::RateLimit {
            message,
            retry_after,
        },
        400 => UnifyError::Validation { message },
        _ => UnifyError::provider("openai", message),
    }
}
