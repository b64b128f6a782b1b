//! Character-based token estimation.
//!
//! The backends this adapter targets expose no token-counting endpoint, so
//! counts are estimated from the prompt text at roughly four characters per
//! token. Good enough for context-window budgeting, not for billing.

use crate::messages::openai::ChatMessage;

/// Estimate the token count of a prompt, rounding up.
pub(crate) fn estimate_tokens(messages: &[ChatMessage]) -> u32 {
    let chars: usize = messages
        .iter()
        .filter_map(|message| message.content.as_deref())
        .map(|content| content.chars().count())
        .sum();

    chars.div_ceil(4) as u32
}
