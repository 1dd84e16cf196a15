//! 请求路由：根据模型标识分发到对应的供应商适配器

use std::fmt;
use std::sync::Arc;

use crate::config::UnifyConfig;
use crate::error::UnifyError;
use crate::http::DynHttpTransport;
use crate::http::reqwest::default_dyn_transport;
use crate::provider::gemini::GeminiAdapter;
use crate::provider::openai::OpenAiAdapter;
use crate::provider::{ChunkStream, DynAdapter};
use crate::types::{ChatRequest, ChatResponse, ModelInfo, Provider};

/// Sampling temperature applied when the caller leaves it unset.
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Fixed two-slot adapter table, one per supported provider.
struct AdapterRegistry {
    openai: Option<DynAdapter>,
    gemini: Option<DynAdapter>,
}

impl AdapterRegistry {
    fn get(&self, provider: Provider) -> Option<&DynAdapter> {
        match provider {
            Provider::OpenAi => self.openai.as_ref(),
            Provider::Gemini => self.gemini.as_ref(),
        }
    }

    /// Configured adapters in registration order (openai first).
    fn iter(&self) -> impl Iterator<Item = &DynAdapter> {
        self.openai.iter().chain(self.gemini.iter())
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("openai", &self.openai.is_some())
            .field("gemini", &self.gemini.is_some())
            .finish()
    }
}

/// Facade routing chat requests to the configured provider adapters.
///
/// Dispatch is driven by [`Provider::from_model_id`]; identifiers matching
/// neither family go to the configured default provider. The client is cheap
/// to share behind an `Arc` since adapters hold no per-request state.
///
/// # Examples
///
/// ```no_run
/// use unify_llm::{ChatRequest, Message, ProviderConfig, UnifyClient, UnifyConfig};
///
/// # async fn run() -> Result<(), unify_llm::UnifyError> {
/// let config = UnifyConfig {
///     openai: Some(ProviderConfig::new("sk-...")),
///     ..Default::default()
/// };
/// let client = UnifyClient::from_config(config)?;
///
/// let response = client
///     .chat_completion(ChatRequest {
///         messages: vec![Message::user("Hello!")],
///         ..Default::default()
///     })
///     .await?;
/// println!("{}", response.choices[0].message.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UnifyClient {
    adapters: AdapterRegistry,
    default_provider: Provider,
    default_model: String,
}

impl UnifyClient {
    /// Builds a client from the configuration using an explicit transport.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::InvalidConfig`] when the resolved default
    /// provider has no configuration entry. A client whose fallback path can
    /// never dispatch is a deployment mistake surfaced at construction, not at
    /// first use.
    pub fn new(config: UnifyConfig, transport: DynHttpTransport) -> Result<Self, UnifyError> {
        let openai = config
            .openai
            .as_ref()
            .map(|entry| Arc::new(OpenAiAdapter::from_config(entry, transport.clone())) as DynAdapter);
        let gemini = config
            .gemini
            .as_ref()
            .map(|entry| Arc::new(GeminiAdapter::from_config(entry, transport.clone())) as DynAdapter);

        let adapters = AdapterRegistry { openai, gemini };
        let default_provider = config.default_provider.unwrap_or(Provider::OpenAi);
        if adapters.get(default_provider).is_none() {
            return Err(UnifyError::InvalidConfig {
                field: "default_provider".to_string(),
                reason: format!("provider '{default_provider}' has no configuration entry"),
            });
        }
        let default_model = config
            .default_model
            .unwrap_or_else(|| default_provider.default_model().to_string());

        Ok(Self {
            adapters,
            default_provider,
            default_model,
        })
    }

    /// Builds a client with the shared production HTTP transport.
    pub fn from_config(config: UnifyConfig) -> Result<Self, UnifyError> {
        Self::new(config, default_dyn_transport()?)
    }

    /// 非流式聊天补全
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, UnifyError> {
        let adapter = self.resolve_adapter(&request)?;
        let request = self.complete_request(request, false);
        adapter.chat_completion(request).await
    }

    /// 流式聊天补全
    pub async fn stream_chat_completion(
        &self,
        request: ChatRequest,
    ) -> Result<ChunkStream, UnifyError> {
        let adapter = self.resolve_adapter(&request)?;
        let request = self.complete_request(request, true);
        adapter.stream_chat_completion(request).await
    }

    /// Lists models, either for one provider or the union of all configured
    /// providers.
    ///
    /// With `provider: None` a failing backend is logged and skipped so one
    /// outage does not hide the other catalog. Results keep registration
    /// order, openai before gemini.
    ///
    /// # Errors
    ///
    /// Returns [`UnifyError::Validation`] when an explicitly requested
    /// provider is not configured.
    pub async fn list_models(
        &self,
        provider: Option<Provider>,
    ) -> Result<Vec<ModelInfo>, UnifyError> {
        if let Some(provider) = provider {
            let adapter = self.adapters.get(provider).ok_or_else(|| {
                UnifyError::Validation {
                    message: format!("provider '{provider}' is not configured"),
                }
            })?;
            return adapter.list_models().await;
        }

        let mut models = Vec::new();
        for adapter in self.adapters.iter() {
            match adapter.list_models().await {
                Ok(mut listed) => models.append(&mut listed),
                Err(err) => {
                    tracing::warn!(
                        provider = adapter.provider().as_str(),
                        error = %err,
                        "model listing failed, skipping provider"
                    );
                }
            }
        }
        Ok(models)
    }

    /// Looks up one model across the configured adapters.
    ///
    /// When the identifier maps to a configured provider that adapter answers
    /// alone; otherwise every adapter is asked in registration order and the
    /// first hit wins.
    pub async fn model_info(&self, model_id: &str) -> Result<Option<ModelInfo>, UnifyError> {
        if let Some(provider) = Provider::from_model_id(model_id) {
            if let Some(adapter) = self.adapters.get(provider) {
                return adapter.model_info(model_id).await;
            }
        }

        for adapter in self.adapters.iter() {
            if let Some(info) = adapter.model_info(model_id).await? {
                return Ok(Some(info));
            }
        }
        Ok(None)
    }

    /// Direct handle to one provider's adapter, if configured.
    pub fn adapter(&self, provider: Provider) -> Option<&DynAdapter> {
        self.adapters.get(provider)
    }

    /// True when the provider has a configured adapter.
    pub fn is_configured(&self, provider: Provider) -> bool {
        self.adapters.get(provider).is_some()
    }

    /// Fills the routing defaults so adapters always see a complete request.
    fn complete_request(&self, mut request: ChatRequest, stream: bool) -> ChatRequest {
        request.model.get_or_insert_with(|| self.default_model.clone());
        request.temperature.get_or_insert(DEFAULT_TEMPERATURE);
        request.stream = Some(stream);
        request
    }

    /// Resolution looks at the caller's partial request, before default
    /// filling, so an unset model always dispatches to the default provider
    /// even when the configured default model belongs to the other family.
    /// Detection falls back to the default provider for unknown identifiers,
    /// and also when the detected provider is not configured.
    fn resolve_adapter(&self, request: &ChatRequest) -> Result<&DynAdapter, UnifyError> {
        let detected = request
            .model
            .as_deref()
            .and_then(Provider::from_model_id)
            .filter(|provider| self.is_configured(*provider));
        let provider = detected.unwrap_or(self.default_provider);

        self.adapters.get(provider).ok_or_else(|| UnifyError::Validation {
            message: format!("provider '{provider}' is not configured"),
        })
    }
}
