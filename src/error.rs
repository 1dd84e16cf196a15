use std::time::Duration;

use thiserror::Error;

/// Aggregates every failure mode exposed by the unified routing layer.
///
/// Callers can match on the specific variant to decide whether to retry, fall back
/// to the other provider, or surface an actionable message to the user interface.
#[derive(Debug, Error)]
pub enum UnifyError {
    /// Represents transport-layer or networking failures.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// Reports invalid or missing credentials.
    #[error("auth failure: {message}")]
    Auth { message: String },
    /// Indicates that the provider throttled the request.
    #[error("rate limited: {message}")]
    RateLimit {
        /// Raw message returned by the upstream provider.
        message: String,
        /// Optional wait duration suggested by the provider before retrying.
        retry_after: Option<Duration>,
    },
    /// Signals validation failures in the request payload or a lookup against
    /// an unconfigured provider.
    #[error("invalid request: {message}")]
    Validation { message: String },
    /// Raised when building or validating configuration fails. Fatal at
    /// construction time, never retried.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the configuration field that failed validation.
        field: String,
        /// Additional context explaining why the field is invalid.
        reason: String,
    },
    /// Wraps provider-reported errors that cannot be normalized further.
    #[error("provider {provider} error: {message}")]
    Provider {
        /// Name of the provider, such as `openai`.
        provider: &'static str,
        /// Human-readable error message returned by the provider.
        message: String,
    },
}

impl UnifyError {
    /// Creates a [`UnifyError::Transport`] from a textual description.
    ///
    /// # Examples
    ///
    /// ```
    /// use unify_llm::error::UnifyError;
    ///
    /// let err = UnifyError::transport("dns lookup failed");
    /// assert!(matches!(err, UnifyError::Transport { .. }));
    /// ```
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a [`UnifyError::Provider`] with the given provider name and message.
    ///
    /// # Examples
    ///
    /// ```
    /// use unify_llm::error::UnifyError;
    ///
    /// let err = UnifyError::provider("openai", "bad JSON payload");
    /// assert!(matches!(err, UnifyError::Provider { provider: "openai", .. }));
    /// ```
    pub fn provider<T: Into<String>>(provider: &'static str, message: T) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}
