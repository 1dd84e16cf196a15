use crate::provider::unix_timestamp;
use crate::types::{ChatResponse, Choice, Message, Role, Usage};

use super::types::{OpenAiChatResponse, OpenAiUsage};

/// Maps the backend reply into the canonical response shape.
pub(crate) fn map_response(resp: OpenAiChatResponse) -> ChatResponse {
    let choices = resp
        .choices
        .into_iter()
        .map(|choice| {
            let message = choice.message.unwrap_or_else(|| super::types::OpenAiMessage {
                role: None,
                content: None,
            });
            Choice {
                index: choice.index,
                message: Message {
                    role: message.role.as_deref().map(parse_role).unwrap_or(Role::Assistant),
                    content: message.content.unwrap_or_default(),
                },
                finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            }
        })
        .collect();

    ChatResponse {
        id: resp.id,
        object: resp.object,
        created: resp.created.unwrap_or_else(unix_timestamp),
        model: resp.model,
        choices,
        usage: resp.usage.map(map_usage).unwrap_or_default(),
    }
}

/// Missing counters collapse to zero, matching the known limitation that some
/// backends do not report usage at all.
pub(crate) fn map_usage(usage: OpenAiUsage) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_tokens.unwrap_or(0),
        completion_tokens: usage.completion_tokens.unwrap_or(0),
        total_tokens: usage.total_tokens.unwrap_or(0),
    }
}

pub(crate) fn parse_role(role: &str) -> Role {
    match role {
        "system" => Role::System,
        "user" => Role::User,
        _ => Role::Assistant,
    }
}
