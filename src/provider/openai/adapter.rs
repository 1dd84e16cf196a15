use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::UnifyError;
use crate::http::{DynHttpTransport, HttpRequest};
use crate::provider::retry::{retry_after_from_headers, retry_with_backoff};
use crate::provider::{ChatAdapter, ChunkStream};
use crate::types::{ChatRequest, ChatResponse, ModelInfo, Provider};

use super::error::parse_openai_error;
use super::models::model_info_from_id;
use super::request::build_openai_body;
use super::response::map_response;
use super::stream::create_stream;
use super::types::{OpenAiChatResponse, OpenAiModelList};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI 聊天补全适配器
pub struct OpenAiAdapter {
    transport: DynHttpTransport,
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl OpenAiAdapter {
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

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    fn apply_auth(&self, request: &mut HttpRequest) {
        request.headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        );
        request.timeout = Some(self.timeout);
    }

    async fn send_chat(&self, payload: &[u8]) -> Result<OpenAiChatResponse, UnifyError> {
        let mut request = HttpRequest::post_json(self.url("chat/completions"), payload.to_vec());
        self.apply_auth(&mut request);

        let response = self.transport.send(request).await?;
        if !(200..300).contains(&response.status) {
            let status = response.status;
            let retry_after = retry_after_from_headers(&response.headers);
            let body = response.into_string().unwrap_or_default();
            return Err(parse_openai_error(status, &body, retry_after));
        }

        serde_json::from_slice(&response.body)
            .map_err(|err| UnifyError::provider("openai", format!("malformed response: {err}")))
    }

    async fn open_stream(
        &self,
        payload: &[u8],
    ) -> Result<crate::http::HttpStreamResponse, UnifyError> {
        let mut request = HttpRequest::post_json(self.url("chat/completions"), payload.to_vec());
        request
            .headers
            .insert("Accept".to_string(), "text/event-stream".to_string());
        self.apply_auth(&mut request);

        let response = self.transport.send_stream(request).await?;
        if !(200..300).contains(&response.status) {
            let retry_after = retry_after_from_headers(&response.headers);
            let body = crate::provider::drain_body(response.body).await;
            return Err(parse_openai_error(response.status, &body, retry_after));
        }
        Ok(response)
    }

    fn resolve_model(&self, request: &ChatRequest) -> String {
        request
            .model
            .clone()
            .unwrap_or_else(|| Provider::OpenAi.default_model().to_string())
    }
}

#[async_trait]
impl ChatAdapter for OpenAiAdapter {
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, UnifyError> {
        let model = self.resolve_model(&request);
        let body = build_openai_body(&request, &model, false);
        let payload = serde_json::to_vec(&body)
            .map_err(|err| UnifyError::provider("openai", format!("encode failure: {err}")))?;

        let parsed =
            retry_with_backoff(self.max_retries, || self.send_chat(&payload)).await?;
        Ok(map_response(parsed))
    }

    async fn stream_chat_completion(
        &self,
        request: ChatRequest,
    ) -> Result<ChunkStream, UnifyError> {
        let model = self.resolve_model(&request);
        let body = build_openai_body(&request, &model, true);
        let payload = serde_json::to_vec(&body)
            .map_err(|err| UnifyError::provider("openai", format!("encode failure: {err}")))?;

        // Only opening the stream is retried. Once chunks start flowing a
        // failure surfaces through the stream itself.
        let response =
            retry_with_backoff(self.max_retries, || self.open_stream(&payload)).await?;
        Ok(create_stream(response.body, model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, UnifyError> {
        let list: OpenAiModelList = retry_with_backoff(self.max_retries, || async {
            let mut request = HttpRequest::get(self.url("models"));
            self.apply_auth(&mut request);

            let response = self.transport.send(request).await?;
            if !(200..300).contains(&response.status) {
                let status = response.status;
                let retry_after = retry_after_from_headers(&response.headers);
                let body = response.into_string().unwrap_or_default();
                return Err(parse_openai_error(status, &body, retry_after));
            }
            serde_json::from_slice(&response.body)
                .map_err(|err| UnifyError::provider("openai", format!("malformed response: {err}")))
        })
        .await?;

        Ok(list
            .data
            .into_iter()
            .filter(|model| model.id.contains("gpt"))
            .map(|model| model_info_from_id(&model.id))
            .collect())
    }

    async fn model_info(&self, model_id: &str) -> Result<Option<ModelInfo>, UnifyError> {
        let probe = retry_with_backoff(self.max_retries, || async {
            let mut request = HttpRequest::get(self.url(&format!("models/{model_id}")));
            self.apply_auth(&mut request);
            self.transport.send(request).await
        })
        .await;

        // Any failure, including exhausted retries, is an expected miss so a
        // dead backend never aborts a cross-provider lookup.
        match probe {
            Ok(response) if (200..300).contains(&response.status) => {
                Ok(Some(model_info_from_id(model_id)))
            }
            _ => Ok(None),
        }
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }
}
