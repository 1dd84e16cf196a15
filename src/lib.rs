//! OpenAI / Gemini 聊天补全统一路由层

pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod router;
pub mod stream;
pub mod types;

pub use config::{ProviderConfig, UnifyConfig};
pub use error::UnifyError;
pub use provider::{ChatAdapter, ChunkStream, DynAdapter};
pub use router::UnifyClient;
pub use types::*;
