use crate::provider::{random_id, unix_timestamp};
use crate::types::{ChatResponse, Choice, Message, Usage};

use super::types::{GeminiGenerateContentResponse, GeminiUsageMetadata};

/// Maps a generateContent reply into the canonical response shape.
///
/// The backend returns no response identifier or timestamp, so both are
/// synthesized here.
pub(crate) fn map_response(parsed: GeminiGenerateContentResponse, model: &str) -> ChatResponse {
    let choices = parsed
        .candidates
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| {
            let text = candidate
                .content
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .filter_map(|part| part.text)
                        .collect::<Vec<_>>()
                        .join("")
                })
                .unwrap_or_default();
            Choice {
                index: candidate.index.unwrap_or(position),
                message: Message::assistant(text),
                finish_reason: map_finish_reason(candidate.finish_reason.as_deref()),
            }
        })
        .collect();

    ChatResponse {
        id: random_id("gemini"),
        object: "chat.completion".to_string(),
        created: unix_timestamp(),
        model: model.to_string(),
        choices,
        usage: parsed.usage_metadata.map(map_usage).unwrap_or_default(),
    }
}

pub(crate) fn map_finish_reason(reason: Option<&str>) -> String {
    match reason {
        Some("STOP") | None => "stop".to_string(),
        Some("MAX_TOKENS") => "length".to_string(),
        Some("SAFETY") => "content_filter".to_string(),
        Some(other) => other.to_ascii_lowercase(),
    }
}

pub(crate) fn map_usage(usage: GeminiUsageMetadata) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_token_count.unwrap_or(0),
        completion_tokens: usage.candidates_token_count.unwrap_or(0),
        total_tokens: usage.total_token_count.unwrap_or(0),
    }
}
