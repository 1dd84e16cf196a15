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
    #[serde(default)]
    status: Option<String>,
}

/// Classifies a non-2xx generateContent reply into the shared error type.
///
/// Google wraps failures in an RPC-style `{"error": {code, message, status}}`
/// envelope; anything else falls back to the raw body text.
pub(crate) fn parse_gemini_error(
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> UnifyError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let detail = envelope.error;
            let mut message = detail.message.unwrap_or_else(|| "unknown error".to_string());
            if let Some(rpc_status) = detail.status {
                message = format!("{message} (status: {rpc_status})");
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
        _ => UnifyError::provider("gemini", message),
    }
}
