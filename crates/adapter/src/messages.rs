//! Message types for the two schemas the adapter bridges.
//!
//! `unified` is the caller-facing Gemini-style representation; `openai` is
//! the chat-completions representation the transport speaks.

pub(crate) mod openai;
pub mod unified;
