use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::UnifyError;
use crate::types::{ChatRequest, ChatResponse, ModelInfo, Provider, StreamChunk};

pub mod gemini;
pub mod openai;
pub(crate) mod retry;

/// 流式响应别名
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, UnifyError>> + Send>>;

/// Adapter hiding one backend's request/response shapes behind the canonical
/// types. The router owns one instance per configured provider.
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    /// Submits a completed request and waits for the full response.
    async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse, UnifyError>;

    /// Submits a completed request and returns an in-order stream of deltas
    /// ending with exactly one terminal chunk.
    async fn stream_chat_completion(&self, request: ChatRequest)
    -> Result<ChunkStream, UnifyError>;

    /// Lists the models this adapter knows about, live or hardcoded.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, UnifyError>;

    /// Looks up one model by identifier; `Ok(None)` when unknown.
    async fn model_info(&self, model_id: &str) -> Result<Option<ModelInfo>, UnifyError>;

    /// Backend identity served by this adapter.
    fn provider(&self) -> Provider;
}

/// 线程安全 Adapter
pub type DynAdapter = Arc<dyn ChatAdapter>;

/// Seconds since the Unix epoch, used for synthesized response timestamps.
pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Collects what is available of an error body; decode failures are dropped so
/// the status-based classification still happens.
pub(crate) async fn drain_body(mut body: crate::http::HttpBodyStream) -> String {
    use futures_util::StreamExt;

    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(data) => bytes.extend_from_slice(&data),
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Synthesizes a response identifier like `gemini-a1B2c3D4e` for backends that
/// do not return one.
pub(crate) fn random_id(prefix: &str) -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_id_has_prefix_and_nine_alphanumerics() {
        let id = random_id("gemini");
        let suffix = id.strip_prefix("gemini-").expect("prefix present");
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|ch| ch.is_ascii_alphanumeric()));
    }
}
