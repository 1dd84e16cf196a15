mod common;

use common::{CannedResponse, MockTransport};
use futures_util::StreamExt;
use serde_json::Value;
use unify_llm::provider::ChatAdapter;
use unify_llm::provider::gemini::GeminiAdapter;
use unify_llm::{ChatRequest, Message, Provider, Role, UnifyError, Usage};

fn chat_request() -> ChatRequest {
    ChatRequest {
        messages: vec![
            Message::system("Be terse."),
            Message::user("Hi"),
            Message::assistant("Hello!"),
            Message::user("Bye"),
        ],
        model: Some("gemini-pro".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn chat_completion_flattens_the_transcript_into_one_turn() {
    let transport = MockTransport::new(vec![CannedResponse::new(
        200,
        r#"{"candidates": [{"content": {"parts": [{"text": "Goodbye"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 1, "totalTokenCount": 10}}"#,
    )]);
    let adapter = GeminiAdapter::new(transport.clone(), "gm-test");

    let response = adapter
        .chat_completion(chat_request())
        .await
        .expect("completion succeeds");

    assert!(response.id.starts_with("gemini-"));
    assert_eq!(response.object, "chat.completion");
    assert_eq!(response.model, "gemini-pro");
    assert_eq!(response.choices[0].message.role, Role::Assistant);
    assert_eq!(response.choices[0].message.content, "Goodbye");
    assert_eq!(response.usage.total_tokens, 10);

    let requests = transport.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
    );
    assert_eq!(
        requests[0].headers.get("x-goog-api-key").map(String::as_str),
        Some("gm-test")
    );

    let body: Value =
        serde_json::from_slice(requests[0].body.as_deref().expect("body present")).expect("json");
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "System: Be terse.\n\nUser: Hi\n\nAssistant: Hello!\n\nUser: Bye"
    );
    assert_eq!(body["contents"][0]["role"], "user");
}

#[tokio::test]
async fn missing_usage_metadata_reports_zero_counts() {
    let transport = MockTransport::new(vec![CannedResponse::new(
        200,
        r#"{"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}"#,
    )]);
    let adapter = GeminiAdapter::new(transport.clone(), "gm-test");

    let response = adapter
        .chat_completion(chat_request())
        .await
        .expect("completion succeeds");
    assert_eq!(response.usage, Usage::default());
    assert_eq!(response.choices[0].finish_reason, "stop");
}

#[tokio::test]
async fn streaming_always_ends_with_a_synthesized_terminal() {
    let sse = concat!(
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Good\"}]}}]}\n\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"bye\"}]},\"finishReason\":\"STOP\"}]}\n\n",
    );
    let transport = MockTransport::new(vec![CannedResponse::new(200, sse)]);
    let adapter = GeminiAdapter::new(transport.clone(), "gm-test");

    let mut stream = adapter
        .stream_chat_completion(chat_request())
        .await
        .expect("stream opens");

    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk.expect("chunk ok"));
    }

    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|chunk| chunk.id == chunks[0].id));
    assert_eq!(chunks[0].choices[0].delta.content.as_deref(), Some("Good"));
    assert_eq!(chunks[1].choices[0].delta.content.as_deref(), Some("bye"));

    let terminal = &chunks[2];
    assert!(terminal.choices[0].delta.is_empty());
    assert_eq!(terminal.choices[0].finish_reason.as_deref(), Some("stop"));

    let requests = transport.recorded_requests();
    assert!(
        requests[0]
            .url
            .ends_with("models/gemini-pro:streamGenerateContent?alt=sse")
    );
}

#[tokio::test]
async fn auth_failures_surface_the_rpc_status() {
    let transport = MockTransport::new(vec![CannedResponse::new(
        403,
        r#"{"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}}"#,
    )]);
    let adapter = GeminiAdapter::new(transport.clone(), "gm-test").with_max_retries(0);

    let err = adapter
        .chat_completion(chat_request())
        .await
        .expect_err("should fail");
    match err {
        UnifyError::Auth { message } => assert!(message.contains("PERMISSION_DENIED")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn model_catalog_is_static_and_never_touches_the_network() {
    let transport = MockTransport::new(Vec::new());
    let adapter = GeminiAdapter::new(transport.clone(), "gm-test");

    let models = adapter.list_models().await.expect("listing succeeds");
    assert_eq!(models.len(), 6);
    assert!(models.iter().all(|model| model.provider == Provider::Gemini));

    let info = adapter
        .model_info("gemini-1.5-flash")
        .await
        .expect("lookup succeeds")
        .expect("known model");
    assert_eq!(info.max_tokens, Some(1_048_576));

    let missing = adapter
        .model_info("gemini-unknown")
        .await
        .expect("lookup succeeds");
    assert!(missing.is_none());

    assert!(transport.recorded_requests().is_empty());
}
