use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::UnifyError;
use crate::http::HttpBodyStream;
use crate::provider::{ChunkStream, random_id, unix_timestamp};
use crate::stream::{SseDecoder, SseEvent};
use crate::types::{MessageDelta, StreamChoice, StreamChunk};

use super::response::parse_role;
use super::types::OpenAiStreamChunk;

/// Turns a raw SSE body into canonical stream chunks.
pub(crate) fn create_stream(body: HttpBodyStream, model: String) -> ChunkStream {
    Box::pin(OpenAiChunkStream {
        decoder: SseDecoder::new(body, "openai"),
        model,
        last_id: None,
        last_created: None,
        finish_seen: false,
        terminated: false,
    })
}

struct OpenAiChunkStream {
    decoder: SseDecoder,
    model: String,
    last_id: Option<String>,
    last_created: Option<u64>,
    finish_seen: bool,
    terminated: bool,
}

impl OpenAiChunkStream {
    fn map_chunk(&mut self, parsed: OpenAiStreamChunk) -> StreamChunk {
        if let Some(id) = &parsed.id {
            self.last_id = Some(id.clone());
        }
        if let Some(created) = parsed.created {
            self.last_created = Some(created);
        }

        let choices = parsed
            .choices
            .into_iter()
            .map(|choice| {
                if choice.finish_reason.is_some() {
                    self.finish_seen = true;
                }
                let delta = choice.delta.unwrap_or(super::types::OpenAiDelta {
                    role: None,
                    content: None,
                });
                StreamChoice {
                    index: choice.index,
                    delta: MessageDelta {
                        role: delta.role.as_deref().map(parse_role),
                        content: delta.content,
                    },
                    finish_reason: choice.finish_reason,
                }
            })
            .collect();

        StreamChunk {
            id: parsed
                .id
                .or_else(|| self.last_id.clone())
                .unwrap_or_else(|| random_id("chatcmpl")),
            object: "chat.completion.chunk".to_string(),
            created: parsed
                .created
                .or(self.last_created)
                .unwrap_or_else(unix_timestamp),
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            choices,
        }
    }

    /// Backends normally send a finish chunk before `[DONE]`; when one never
    /// arrives the consumer still gets exactly one terminal chunk.
    fn terminal_chunk(&self) -> StreamChunk {
        StreamChunk {
            id: self
                .last_id
                .clone()
                .unwrap_or_else(|| random_id("chatcmpl")),
            object: "chat.completion.chunk".to_string(),
            created: self.last_created.unwrap_or_else(unix_timestamp),
            model: self.model.clone(),
            choices: vec![StreamChoice {
                index: 0,
                delta: MessageDelta {
                    role: None,
                    content: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

impl Stream for OpenAiChunkStream {
    type Item = Result<StreamChunk, UnifyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.terminated {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.decoder).poll_next(cx) {
            Poll::Ready(Some(Ok(SseEvent::Data(data)))) => {
                match serde_json::from_str::<OpenAiStreamChunk>(&data) {
                    Ok(parsed) => Poll::Ready(Some(Ok(this.map_chunk(parsed)))),
                    Err(err) => {
                        this.terminated = true;
                        Poll::Ready(Some(Err(UnifyError::provider(
                            "openai",
                            format!("malformed stream chunk: {err}"),
                        ))))
                    }
                }
            }
            Poll::Ready(Some(Ok(SseEvent::Done))) | Poll::Ready(None) => {
                this.terminated = true;
                if this.finish_seen {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(this.terminal_chunk())))
                }
            }
            Poll::Ready(Some(Err(err))) => {
                this.terminated = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use futures_util::stream;

    use crate::types::Role;

    use super::*;

    fn build_body(frames: &[&str]) -> HttpBodyStream {
        let chunks: Vec<Result<Vec<u8>, UnifyError>> = frames
            .iter()
            .map(|frame| Ok(frame.as_bytes().to_vec()))
            .collect();
        Box::pin(stream::iter(chunks))
    }

    #[tokio::test]
    async fn deltas_arrive_in_order_with_single_terminal() {
        let body = build_body(&[
            "data: {\"id\":\"chatcmpl-9\",\"created\":1700000000,\"model\":\"gpt-4\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n",
            "data: {\"id\":\"chatcmpl-9\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: {\"id\":\"chatcmpl-9\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        ]);
        let mut chunks = create_stream(body, "gpt-4".to_string());

        let first = chunks.next().await.expect("chunk").expect("ok");
        assert_eq!(first.id, "chatcmpl-9");
        assert_eq!(first.created, 1_700_000_000);
        assert_eq!(first.choices[0].delta.role, Some(Role::Assistant));
        assert_eq!(first.choices[0].delta.content.as_deref(), Some("Hel"));
        assert_eq!(first.choices[0].finish_reason, None);

        let second = chunks.next().await.expect("chunk").expect("ok");
        assert_eq!(second.choices[0].delta.content.as_deref(), Some("lo"));

        let third = chunks.next().await.expect("chunk").expect("ok");
        assert!(third.choices[0].delta.is_empty());
        assert_eq!(third.choices[0].finish_reason.as_deref(), Some("stop"));

        assert!(chunks.next().await.is_none());
    }

    #[tokio::test]
    async fn missing_finish_chunk_is_synthesized() {
        let body = build_body(&[
            "data: {\"id\":\"chatcmpl-7\",\"created\":1700000001,\"choices\":[{\"index\":0,\"delta\":{\"content\":\"hi\"}}]}\n\n",
            "data: [DONE]\n\n",
        ]);
        let mut chunks = create_stream(body, "gpt-4".to_string());

        let first = chunks.next().await.expect("chunk").expect("ok");
        assert_eq!(first.choices[0].delta.content.as_deref(), Some("hi"));

        let terminal = chunks.next().await.expect("chunk").expect("ok");
        assert_eq!(terminal.id, "chatcmpl-7");
        assert_eq!(terminal.created, 1_700_000_001);
        assert_eq!(terminal.model, "gpt-4");
        assert!(terminal.choices[0].delta.is_empty());
        assert_eq!(terminal.choices[0].finish_reason.as_deref(), Some("stop"));

        assert!(chunks.next().await.is_none());
    }

    #[tokio::test]
    async fn malformed_chunk_surfaces_as_provider_error() {
        let body = build_body(&["data: not json\n\n"]);
        let mut chunks = create_stream(body, "gpt-4".to_string());

        let err = chunks.next().await.expect("item").unwrap_err();
        match err {
            UnifyError::Provider { provider, message } => {
                assert_eq!(provider, "openai");
                assert!(message.contains("malformed stream chunk"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(chunks.next().await.is_none());
    }

    #[tokio::test]
    async fn body_end_without_done_marker_still_terminates() {
        let body = build_body(&[
            "data: {\"id\":\"chatcmpl-3\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"x\"}}]}\n\n",
        ]);
        let mut chunks = create_stream(body, "gpt-4".to_string());

        let first = chunks.next().await.expect("chunk").expect("ok");
        assert_eq!(first.choices[0].delta.content.as_deref(), Some("x"));

        let terminal = chunks.next().await.expect("chunk").expect("ok");
        assert_eq!(terminal.choices[0].finish_reason.as_deref(), Some("stop"));

        assert!(chunks.next().await.is_none());
    }
}
