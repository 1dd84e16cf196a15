use serde_json::{Map, Value, json};

use crate::types::{ChatRequest, Role};

/// Flattens a chat transcript into a single labelled prompt.
///
/// The generateContent API models multi-turn history differently, so the whole
/// conversation is sent as one user turn with `System:` / `User:` /
/// `Assistant:` labels separating the original messages.
pub(crate) fn flatten_transcript(request: &ChatRequest) -> String {
    let mut transcript = String::new();
    for message in &request.messages {
        let label = match message.role {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        transcript.push_str(label);
        transcript.push_str(": ");
        transcript.push_str(&message.content);
        transcript.push_str("\n\n");
    }
    transcript.trim_end().to_string()
}

/// Builds the generateContent request body.
///
/// `generationConfig` is only attached when at least one tuning knob is set so
/// the backend keeps its own defaults otherwise.
pub(crate) fn build_gemini_body(request: &ChatRequest) -> Value {
    let mut body = Map::new();
    body.insert(
        "contents".to_string(),
        json!([{
            "role": "user",
            "parts": [{"text": flatten_transcript(request)}],
        }]),
    );

    let mut generation_config = Map::new();
    if let Some(temperature) = request.temperature {
        generation_config.insert("temperature".to_string(), Value::from(temperature));
    }
    if let Some(max_tokens) = request.max_tokens {
        generation_config.insert("maxOutputTokens".to_string(), Value::from(max_tokens));
    }
    if let Some(top_p) = request.top_p {
        generation_config.insert("topP".to_string(), Value::from(top_p));
    }
    if !generation_config.is_empty() {
        body.insert(
            "generationConfig".to_string(),
            Value::Object(generation_config),
        );
    }

    Value::Object(body)
}
