use serde_json::{Map, Value, json};

use crate::types::ChatRequest;

/// Translates a completed canonical request into the chat-completions body.
///
/// Unset optional fields are omitted entirely so the backend applies its own
/// documented defaults instead of receiving zeros.
pub(crate) fn build_openai_body(request: &ChatRequest, model: &str, stream: bool) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(model.to_string()));
    body.insert(
        "messages".to_string(),
        Value::Array(
            request
                .messages
                .iter()
                .map(|message| json!({"role": message.role, "content": message.content}))
                .collect(),
        ),
    );
    if let Some(temperature) = request.temperature {
        body.insert("temperature".to_string(), Value::from(temperature));
    }
    if let Some(max_tokens) = request.max_tokens {
        body.insert("max_tokens".to_string(), Value::from(max_tokens));
    }
    if let Some(top_p) = request.top_p {
        body.insert("top_p".to_string(), Value::from(top_p));
    }
    if let Some(penalty) = request.frequency_penalty {
        body.insert("frequency_penalty".to_string(), Value::from(penalty));
    }
    if let Some(penalty) = request.presence_penalty {
        body.insert("presence_penalty".to_string(), Value::from(penalty));
    }
    body.insert("stream".to_string(), Value::Bool(stream));
    Value::Object(body)
}
