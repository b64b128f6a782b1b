//! Streaming tool-call reassembly.
//!
//! Backends split a tool call's JSON arguments across many stream fragments.
//! [`ToolCallReassembler`] accumulates those fragments per tool-call index for
//! the lifetime of one streaming call; [`ReassemblingStream`] drives it,
//! translating backend chunks into unified response fragments as they arrive
//! and flushing accumulated calls when the backend signals completion.

use std::{
    collections::{BTreeMap, VecDeque},
    pin::Pin,
    task::{Context, Poll, ready},
};

use futures::Stream;
use serde_json::{Map, Value};

use crate::{
    json_repair,
    messages::{
        openai::{FinishReason, ToolCallDelta},
        unified::{GenerateResponse, UnifiedPart},
    },
    provider::ChatCompletionStream,
};

/// Per-stream accumulator for fragmented tool calls.
///
/// Keyed by the fragment index, which is stable per tool call within one
/// stream. A `BTreeMap` keeps flush order ascending by index even if a
/// backend delivers deltas out of order.
#[derive(Debug, Default)]
pub(crate) struct ToolCallReassembler {
    pending: BTreeMap<u32, PendingToolCall>,
}

#[derive(Debug, Default)]
struct PendingToolCall {
    name: String,
    arguments: String,
}

impl ToolCallReassembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment's tool-call deltas into the accumulator.
    ///
    /// A name delta overwrites (last write wins, the defensive choice for
    /// index reuse); an arguments delta always appends.
    pub(crate) fn absorb(&mut self, deltas: &[ToolCallDelta]) {
        for delta in deltas {
            let entry = self.pending.entry(delta.index).or_default();

            let Some(function) = &delta.function else {
                continue;
            };

            if let Some(name) = &function.name {
                entry.name.clone_from(name);
            }

            if let Some(arguments) = &function.arguments {
                entry.arguments.push_str(arguments);
            }
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain the accumulator into function-call parts, ascending by index.
    ///
    /// Accumulated argument text is repaired into a structured value; empty
    /// text maps to an empty object without a parse attempt. The accumulator
    /// is cleared even when repair fails, since the stream ends either way.
    pub(crate) fn flush(&mut self) -> crate::Result<Vec<UnifiedPart>> {
        let pending = std::mem::take(&mut self.pending);
        let mut parts = Vec::with_capacity(pending.len());

        for (_, call) in pending {
            let args = if call.arguments.trim().is_empty() {
                Value::Object(Map::new())
            } else {
                json_repair::repair(&call.arguments)?
            };

            parts.push(UnifiedPart::function_call(call.name, args));
        }

        Ok(parts)
    }
}

/// Stream adapter turning backend chunks into unified response fragments.
///
/// Text deltas pass through immediately and unbuffered; tool-call deltas are
/// accumulated and flushed together with the terminal fragment when a finish
/// reason arrives. After the finish reason the inner transport is no longer
/// polled, and dropping this stream drops the transport connection.
pub(crate) struct ReassemblingStream {
    inner: ChatCompletionStream,
    reassembler: ToolCallReassembler,
    queued: VecDeque<crate::Result<GenerateResponse>>,
    done: bool,
}

impl ReassemblingStream {
    pub(crate) fn new(inner: ChatCompletionStream) -> Self {
        Self {
            inner,
            reassembler: ToolCallReassembler::new(),
            queued: VecDeque::new(),
            done: false,
        }
    }
}

impl Stream for ReassemblingStream {
    type Item = crate::Result<GenerateResponse>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.queued.pop_front() {
                return Poll::Ready(Some(item));
            }

            if self.done {
                return Poll::Ready(None);
            }

            match ready!(self.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    let Some(choice) = chunk.choices.into_iter().next() else {
                        continue;
                    };

                    if let Some(text) = choice.delta.content
                        && !text.is_empty()
                    {
                        self.queued
                            .push_back(Ok(GenerateResponse::from_parts(vec![UnifiedPart::text(text)])));
                    }

                    if let Some(deltas) = choice.delta.tool_calls {
                        self.reassembler.absorb(&deltas);
                    }

                    if let Some(reason) = choice.finish_reason {
                        if reason == FinishReason::ToolCalls && self.reassembler.has_pending() {
                            match self.reassembler.flush() {
                                Ok(parts) => {
                                    self.queued.push_back(Ok(GenerateResponse::from_parts(parts)));
                                }
                                Err(error) => {
                                    self.queued.push_back(Err(error));
                                    self.done = true;
                                    continue;
                                }
                            }
                        }

                        self.queued.push_back(Ok(GenerateResponse::from_parts(Vec::new())));
                        self.done = true;
                    }
                }
                Some(Err(error)) => {
                    self.queued.push_back(Err(error));
                    self.done = true;
                }
                None => {
                    self.done = true;
                }
            }
        }
    }
}
