//! Server-Sent Events decoding shared by both provider adapters.
//!
//! The backends frame streaming responses as SSE. This module turns a raw byte
//! stream into complete `data:` payloads plus the `[DONE]` terminal marker so
//! each adapter only has to parse its own JSON chunk format.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::UnifyError;
use crate::http::HttpBodyStream;

/// Event yielded by [`SseDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Complete `data:` payload (multi-line payloads are newline-joined).
    Data(String),
    /// Terminal `[DONE]` marker. Not all backends send one; the decoder also
    /// ends cleanly when the body stream closes.
    Done,
}

/// Incremental SSE decoder over an HTTP body stream.
///
/// Bytes are buffered until a full line is available, so UTF-8 sequences and
/// events split across network reads are reassembled correctly. Events are
/// yielded strictly in arrival order.
pub struct SseDecoder {
    body: HttpBodyStream,
    buffer: Vec<u8>,
    data_lines: Vec<Vec<u8>>,
    ready: VecDeque<SseEvent>,
    provider: &'static str,
    body_closed: bool,
    done: bool,
}

impl SseDecoder {
    /// Wraps a raw HTTP body stream; `provider` labels decode errors.
    pub fn new(body: HttpBodyStream, provider: &'static str) -> Self {
        Self {
            body,
            buffer: Vec::new(),
            data_lines: Vec::new(),
            ready: VecDeque::new(),
            provider,
            body_closed: false,
            done: false,
        }
    }

    /// Pops one complete line (without its terminator) off the byte buffer.
    fn take_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
        let pos = buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    fn accept_line(&mut self, line: Vec<u8>) {
        let Some(rest) = line.strip_prefix(b"data:") else {
            // Field names other than `data` (event ids, comments) are ignored.
            return;
        };
        let payload = rest.strip_prefix(b" ").unwrap_or(rest);
        self.data_lines.push(payload.to_vec());
    }

    /// A blank line terminates an event; join the accumulated data lines.
    fn finish_event(&mut self) -> Result<(), UnifyError> {
        if self.data_lines.is_empty() {
            return Ok(());
        }
        let joined = self.data_lines.join(&b'\n');
        self.data_lines.clear();
        if joined.is_empty() {
            return Ok(());
        }
        let data = String::from_utf8(joined).map_err(|err| UnifyError::Provider {
            provider: self.provider,
            message: format!("invalid UTF-8 in stream chunk: {err}"),
        })?;
        if data.trim() == "[DONE]" {
            if !self.done {
                self.done = true;
                self.ready.push_back(SseEvent::Done);
            }
        } else {
            self.ready.push_back(SseEvent::Data(data));
        }
        Ok(())
    }
}

impl Stream for SseDecoder {
    type Item = Result<SseEvent, UnifyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if this.done {
                return Poll::Ready(None);
            }
            if this.body_closed {
                // Flush a trailing line without terminator, then the final event.
                if !this.buffer.is_empty() {
                    let line = std::mem::take(&mut this.buffer);
                    this.accept_line(line);
                }
                if let Err(err) = this.finish_event() {
                    return Poll::Ready(Some(Err(err)));
                }
                return match this.ready.pop_front() {
                    Some(event) => Poll::Ready(Some(Ok(event))),
                    None => Poll::Ready(None),
                };
            }

            match this.body.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                    while let Some(line) = Self::take_line(&mut this.buffer) {
                        if line.is_empty() {
                            if let Err(err) = this.finish_event() {
                                return Poll::Ready(Some(Err(err)));
                            }
                        } else {
                            this.accept_line(line);
                        }
                    }
                }
                Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
                Poll::Ready(None) => this.body_closed = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
