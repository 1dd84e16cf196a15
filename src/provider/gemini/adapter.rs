use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::UnifyError;
use crate::http::{DynHttpTransport, HttpRequest};
use crate::provider::retry::{retry_after_from_headers, retry_with_backoff};
use crate::provider::{ChatAdapter, ChunkStream};
use crate::types::{ChatRequest, ChatResponse, ModelInfo, Provider};

use super::catalog;
use super::error::parse_gemini_error;
use super::request::build_gemini_body;
use super::response::map_response;
use super::stream::create_stream;
use super::types::GeminiGenerateContentResponse;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini generateContent 适配器
pub struct GeminiAdapter {
    transport: DynHttpTransport,
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl GeminiAdapter {
    /// 使用默认 endpoint 构造
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: crate::config::DEFAULT_TIMEOUT,
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
        }
    }

    /// 自定义 base_url（如代理端点）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 自定义请求超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 自定义最大重试次数
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builds an adapter from a provider configuration entry.
    pub fn from_config(config: &ProviderConfig, transport: DynHttpTransport) -> Self {
        let mut adapter = Self::new(transport, config.api_key.clone())
            .with_timeout(config.effective_timeout())
            .with_max_retries(config.effective_max_retries());
        if let Some(base_url) = &config.base_url {
            adapter = adapter.with_base_url(base_url.clone());
        }
        adapter
    }

    /// The REST path expects resource names like `models/gemini-pro`; bare
    /// model identifiers get the prefix added.
    fn model_resource(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{}:{method}",
            self.base_url.trim_end_matches('/'),
            Self::model_resource(model)
        )
    }

    fn apply_auth(&self, request: &mut HttpRequest) {
        request
            .headers
            .insert("x-goog-api-key".to_string(), self.api_key.clone());
        request.timeout = Some(self.timeout);
    }

    fn resolve_model(&self, request: &ChatRequest) -> String {
        request
            .model
            .clone()
            .unwrap_or_else(|| Provider::Gemini.default_model().to_string())
    }

    async fn send_generate(
        &self,
        model: &str,
        payload: &[u8],
    ) -> Result<GeminiGenerateContentResponse, UnifyError> {
        let mut request =
            HttpRequest::post_json(self.url(model, "generateContent"), payload.to_vec());
        self.apply_auth(&mut request);

        let response = self.transport.send(request).await?;
        if !(200..300).contains(&response.status) {
            let status = response.status;
            let retry_after = retry_after_from_headers(&response.headers);
            let body = response.into_string().unwrap_or_default();
            return Err(parse_gemini_error(status, &body, retry_after));
        }

        serde_json::from_slice(&response.body)
            .map_err(|err| UnifyError::provider("gemini", format!("malformed response: {err}")))
    }

    async fn open_stream(
        &self,
        model: &str,
        payload: &[u8],
    ) -> Result<crate::http::HttpStreamResponse, UnifyError> {
        let url = format!("{}?alt=sse", self.url(model, "streamGenerateContent"));
        let mut request = HttpRequest::post_json(url, payload.to_vec());
        request
            .headers
            .insert("Accept".to_string(), "text/event-stream".to_string());
        self.apply_auth(&mut request);

        let response = self.transport.send_stream(request).await?;
        if !(200..300).contains(&response.status) {
            let retry_after = retry_after_from_headers(&response.headers);
            let body = crate::provider::drain_body(response.body).await;
            return Err(parse_gemini_error(response.status, &body, retry_after));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatAdapter for GeminiAdapter {
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, UnifyError> {
        let model = self.resolve_model(&request);
        let body = build_gemini_body(&request);
        let payload = serde_json::to_vec(&body)
            .map_err(|err| UnifyError::provider("gemini", format!("encode failure: {err}")))?;

        let parsed =
            retry_with_backoff(self.max_retries, || self.send_generate(&model, &payload)).await?;
        Ok(map_response(parsed, &model))
    }

    async fn stream_chat_completion(
        &self,
        request: ChatRequest,
    ) -> Result<ChunkStream, UnifyError> {
        let model = self.resolve_model(&request);
        let body = build_gemini_body(&request);
        let payload = serde_json::to_vec(&body)
            .map_err(|err| UnifyError::provider("gemini", format!("encode failure: {err}")))?;

        // Only opening the stream is retried, never mid-stream failures.
        let response =
            retry_with_backoff(self.max_retries, || self.open_stream(&model, &payload)).await?;
        Ok(create_stream(response.body, model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, UnifyError> {
        Ok(catalog::catalog())
    }

    async fn model_info(&self, model_id: &str) -> Result<Option<ModelInfo>, UnifyError> {
        Ok(catalog::lookup(model_id))
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }
}
