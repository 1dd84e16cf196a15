mod common;

use common::{CannedResponse, MockTransport};
use unify_llm::{
    ChatRequest, Message, Provider, ProviderConfig, UnifyClient, UnifyConfig, UnifyError,
};

#[test]
fn construction_fails_when_default_provider_is_unconfigured() {
    let transport = MockTransport::new(Vec::new());
    let config = UnifyConfig {
        gemini: Some(ProviderConfig::new("gm-key")),
        ..Default::default()
    };

    // Default provider falls back to openai, which has no entry here.
    let err = UnifyClient::new(config, transport.clone()).expect_err("should fail");
    match err {
        UnifyError::InvalidConfig { field, reason } => {
            assert_eq!(field, "default_provider");
            assert!(reason.contains("openai"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn construction_succeeds_with_explicit_default_provider() {
    let transport = MockTransport::new(Vec::new());
    let config = UnifyConfig {
        gemini: Some(ProviderConfig::new("gm-key")),
        default_provider: Some(Provider::Gemini),
        ..Default::default()
    };

    let client = UnifyClient::new(config, transport.clone()).expect("valid configuration");
    assert!(client.is_configured(Provider::Gemini));
    assert!(!client.is_configured(Provider::OpenAi));
    assert!(client.adapter(Provider::Gemini).is_some());
    assert!(client.adapter(Provider::OpenAi).is_none());
}

#[tokio::test]
async fn dispatch_reaches_the_detected_provider_end_to_end() {
    let transport = MockTransport::new(vec![CannedResponse::new(
        200,
        r#"{"candidates": [{"content": {"parts": [{"text": "pong"}]}, "finishReason": "STOP"}]}"#,
    )]);
    let config = UnifyConfig {
        openai: Some(ProviderConfig::new("sk-key")),
        gemini: Some(ProviderConfig::new("gm-key")),
        ..Default::default()
    };
    let client = UnifyClient::new(config, transport.clone()).expect("valid configuration");

    let response = client
        .chat_completion(ChatRequest {
            messages: vec![Message::user("ping")],
            model: Some("gemini-pro".to_string()),
            ..Default::default()
        })
        .await
        .expect("completion succeeds");

    assert_eq!(response.model, "gemini-pro");
    assert_eq!(response.choices[0].message.content, "pong");

    let requests = transport.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.contains("models/gemini-pro:generateContent"));
}

#[tokio::test]
async fn requests_to_an_unconfigured_detected_provider_use_the_default() {
    let transport = MockTransport::new(vec![CannedResponse::new(
        200,
        r#"{"id": "chatcmpl-1", "object": "chat.completion", "created": 1, "model": "gemini-pro",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}]}"#,
    )]);
    let config = UnifyConfig {
        openai: Some(ProviderConfig::new("sk-key")),
        ..Default::default()
    };
    let client = UnifyClient::new(config, transport.clone()).expect("valid configuration");

    // gemini-pro detects as gemini, but only openai is configured.
    client
        .chat_completion(ChatRequest {
            messages: vec![Message::user("ping")],
            model: Some("gemini-pro".to_string()),
            ..Default::default()
        })
        .await
        .expect("completion succeeds");

    let requests = transport.recorded_requests();
    assert!(requests[0].url.contains("chat/completions"));
}
