use crate::types::{ModelInfo, Provider};

/// Known context-window sizes, checked by substring with the most specific
/// names first so `gpt-4-32k` is not swallowed by the `gpt-4` entry.
const MODEL_TOKEN_LIMITS: &[(&str, u32)] = &[
    ("gpt-4-turbo-preview", 128_000),
    ("gpt-4-turbo", 128_000),
    ("gpt-4-32k", 32_768),
    ("gpt-4", 8_192),
    ("gpt-3.5-turbo-16k", 16_384),
    ("gpt-3.5-turbo", 4_096),
];

pub(crate) fn max_tokens_for_model(model_id: &str) -> Option<u32> {
    MODEL_TOKEN_LIMITS
        .iter()
        .find(|(name, _)| model_id.contains(name))
        .map(|(_, limit)| *limit)
}

pub(crate) fn model_info_from_id(model_id: &str) -> ModelInfo {
    ModelInfo {
        id: model_id.to_string(),
        name: model_id.to_string(),
        provider: Provider::OpenAi,
        max_tokens: max_tokens_for_model(model_id),
        supports_streaming: true,
    }
}
