//! OpenAI-style chat-completions adapter.

mod adapter;
mod error;
mod models;
mod request;
mod response;
mod stream;
mod types;

pub use adapter::OpenAiAdapter;
