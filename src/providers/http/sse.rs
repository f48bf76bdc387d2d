use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

use super::utf8::Utf8Decoder;
use crate::providers::deepseek::types::ChatCompletionChunk;
use crate::providers::error::ProviderError;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Delta(String),
    Done,
    Skip,
}

/// Turns chat-completion SSE bytes into content deltas.
///
/// Lines are only processed once their terminating `\n` has arrived, so the
/// output does not depend on how the transport chunks the body. After the
/// `[DONE]` sentinel the parser is closed and ignores further input.
#[derive(Debug, Default)]
pub struct SseParser {
    utf8: Utf8Decoder,
    buffer: String,
    done: bool,
}

impl SseParser {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            utf8: Utf8Decoder::new(),
            buffer: String::new(),
            done: false,
        }
    }

    pub fn process_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.done {
            return Vec::new();
        }

        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        let mut deltas = Vec::new();

        while let Some(line_end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=line_end).collect();
            let line = &line[..line.len() - 1];
            let line = line.strip_suffix('\r').unwrap_or(line);

            match parse_line(line) {
                Frame::Delta(delta) => deltas.push(delta),
                Frame::Done => {
                    self.done = true;
                    self.buffer.clear();
                    break;
                }
                Frame::Skip => {}
            }
        }

        deltas
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Wraps a response body. The body is owned by the returned stream and
    /// dropped as soon as the stream ends: on `[DONE]`, end of input, the
    /// first transport error, or when the consumer drops it.
    pub fn parse_stream<S, E>(byte_stream: S) -> DeltaStream
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<ProviderError> + Send + 'static,
    {
        let state = StreamState {
            bytes: Box::pin(byte_stream),
            parser: Self::new(),
            queue: VecDeque::new(),
            failed: false,
        };

        Box::pin(stream::unfold(state, |mut state| async move {
            loop {
                if let Some(delta) = state.queue.pop_front() {
                    return Some((Ok(delta), state));
                }
                if state.failed || state.parser.is_done() {
                    return None;
                }

                match state.bytes.next().await {
                    Some(Ok(chunk)) => {
                        let deltas = state.parser.process_chunk(&chunk);
                        state.queue.extend(deltas);
                    }
                    Some(Err(e)) => {
                        state.failed = true;
                        return Some((Err(e.into()), state));
                    }
                    None => {
                        if !state.parser.buffer.is_empty() {
                            tracing::debug!(
                                bytes = state.parser.buffer.len(),
                                "Discarding unterminated trailing SSE line"
                            );
                        }
                        return None;
                    }
                }
            }
        }))
    }
}

struct StreamState<S> {
    bytes: Pin<Box<S>>,
    parser: SseParser,
    queue: VecDeque<String>,
    failed: bool,
}

fn parse_line(line: &str) -> Frame {
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Skip;
    };

    if data == DONE_SENTINEL {
        return Frame::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk
            .into_content()
            .filter(|content| !content.is_empty())
            .map_or(Frame::Skip, Frame::Delta),
        Err(e) => {
            tracing::debug!(
                error = %e,
                frame = %truncate(data, 100),
                "Skipping malformed SSE frame"
            );
            Frame::Skip
        }
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
