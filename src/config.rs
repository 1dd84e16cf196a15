use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Provider;

/// Default request timeout handed to the backend when the configuration does
/// not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after a failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// 单个供应商的连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key forwarded to the backend; the crate never manages its lifecycle.
    pub api_key: String,
    /// Override for the provider's default endpoint, e.g. a proxy.
    pub base_url: Option<String>,
    /// Per-request timeout enforced by the transport.
    pub timeout: Option<Duration>,
    /// Retries after the first failed attempt; effective default is 3.
    pub max_retries: Option<u32>,
}

impl ProviderConfig {
    /// 使用默认 endpoint 与重试配置
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
            max_retries: None,
        }
    }

    /// 自定义 base_url
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// 自定义请求超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 自定义最大重试次数
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Effective timeout after applying the default.
    pub fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Effective retry budget after applying the default.
    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }
}

/// Top-level configuration for [`crate::router::UnifyClient`].
///
/// Zero, one, or both providers may be configured; an unset provider is simply
/// absent rather than present-but-disabled. The resolved default provider must
/// correspond to a configured adapter or construction fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifyConfig {
    pub openai: Option<ProviderConfig>,
    pub gemini: Option<ProviderConfig>,
    /// Provider used when a request's model resolves to neither family;
    /// defaults to [`Provider::OpenAi`].
    pub default_provider: Option<Provider>,
    /// Model used when a request omits one; defaults to the default
    /// provider's static default.
    pub default_model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_config_applies_defaults() {
        let config = ProviderConfig::new("test-key");
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.effective_max_retries(), DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn provider_config_builder_overrides_defaults() {
        let config = ProviderConfig::new("test-key")
            .with_base_url("https://proxy.internal")
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(1);

        assert_eq!(config.base_url.as_deref(), Some("https://proxy.internal"));
        assert_eq!(config.effective_timeout(), Duration::from_secs(5));
        assert_eq!(config.effective_max_retries(), 1);
    }
}
