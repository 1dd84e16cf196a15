use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::UnifyError;
use crate::http::HttpBodyStream;
use crate::provider::{ChunkStream, random_id, unix_timestamp};
use crate::stream::{SseDecoder, SseEvent};
use crate::types::{MessageDelta, Role, StreamChoice, StreamChunk};

use super::response::map_finish_reason;
use super::types::GeminiGenerateContentResponse;

/// Turns a streamGenerateContent SSE body into canonical stream chunks.
///
/// One identifier is minted per stream so every chunk of a response shares it.
pub(crate) fn create_stream(body: HttpBodyStream, model: String) -> ChunkStream {
    Box::pin(GeminiChunkStream {
        decoder: SseDecoder::new(body, "gemini"),
        id: random_id("gemini"),
        created: unix_timestamp(),
        model,
        finish_reason: None,
        terminated: false,
    })
}

struct GeminiChunkStream {
    decoder: SseDecoder,
    id: String,
    created: u64,
    model: String,
    finish_reason: Option<String>,
    terminated: bool,
}

impl GeminiChunkStream {
    /// Content chunks never carry a finish reason; the recorded one is emitted
    /// on the single synthesized terminal chunk instead.
    fn map_chunk(&mut self, parsed: GeminiGenerateContentResponse) -> Option<StreamChunk> {
        let candidate = parsed.candidates.into_iter().next()?;
        if let Some(reason) = candidate.finish_reason {
            self.finish_reason = Some(map_finish_reason(Some(&reason)));
        }
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
        if text.is_empty() {
            return None;
        }

        Some(StreamChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![StreamChoice {
                index: 0,
                delta: MessageDelta {
                    role: Some(Role::Assistant),
                    content: Some(text),
                },
                finish_reason: None,
            }],
        })
    }

    fn terminal_chunk(&mut self) -> StreamChunk {
        StreamChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![StreamChoice {
                index: 0,
                delta: MessageDelta {
                    role: None,
                    content: None,
                },
                finish_reason: Some(self.finish_reason.take().unwrap_or_else(|| "stop".to_string())),
            }],
        }
    }
}

impl Stream for GeminiChunkStream {
    type Item = Result<StreamChunk, UnifyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.terminated {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.decoder).poll_next(cx) {
                Poll::Ready(Some(Ok(SseEvent::Data(data)))) => {
                    match serde_json::from_str::<GeminiGenerateContentResponse>(&data) {
                        // Keep-alive or finish-only chunks produce no delta.
                        Ok(parsed) => match this.map_chunk(parsed) {
                            Some(chunk) => return Poll::Ready(Some(Ok(chunk))),
                            None => continue,
                        },
                        Err(err) => {
                            this.terminated = true;
                            return Poll::Ready(Some(Err(UnifyError::provider(
                                "gemini",
                                format!("malformed stream chunk: {err}"),
                            ))));
                        }
                    }
                }
                Poll::Ready(Some(Ok(SseEvent::Done))) | Poll::Ready(None) => {
                    this.terminated = true;
                    return Poll::Ready(Some(Ok(this.terminal_chunk())));
                }
                Poll::Ready(Some(Err(err))) => {
                    this.terminated = true;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
