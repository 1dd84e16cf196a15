//! Google Gemini generateContent adapter.

mod adapter;
mod catalog;
mod error;
mod request;
mod response;
mod stream;
mod types;

pub use adapter::GeminiAdapter;
