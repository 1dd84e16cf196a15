use crate::types::{ModelInfo, Provider};

/// Static model catalog; the generateContent API has no stable listing
/// endpoint compatible with API-key auth, so the supported set is pinned.
const CATALOG: &[(&str, u32)] = &[
    ("gemini-2.0-flash-001", 1_048_576),
    ("gemini-2.0-flash-exp", 1_048_576),
    ("gemini-1.5-pro", 1_048_576),
    ("gemini-1.5-flash", 1_048_576),
    ("gemini-pro", 32_768),
    ("gemini-pro-vision", 32_768),
];

pub(crate) fn catalog() -> Vec<ModelInfo> {
    CATALOG
        .iter()
        .map(|(id, max_tokens)| entry(id, *max_tokens))
        .collect()
}

pub(crate) fn lookup(model_id: &str) -> Option<ModelInfo> {
    CATALOG
        .iter()
        .find(|(id, _)| *id == model_id)
        .map(|(id, max_tokens)| entry(id, *max_tokens))
}

fn entry(id: &str, max_tokens: u32) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: id.to_string(),
        provider: Provider::Gemini,
        max_tokens: Some(max_tokens),
        supports_streaming: true,
    }
}
