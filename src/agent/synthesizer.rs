//! Response synthesis: turning model turns into answer text.

use super::message::ContentBlock;

/// Answer returned when a tool round fails and the model gave no text.
pub const FALLBACK_MESSAGE: &str =
    "I encountered an issue accessing the course materials. Please try rephrasing your question.";

/// Returns the payload of the first text block, or an empty string when
/// the turn holds no text (e.g. only tool-use blocks).
#[must_use]
pub fn extract_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::ToolUse { .. } | ContentBlock::ToolResult { .. } => None,
        })
        .unwrap_or_default()
}

/// Best-effort answer after a failed tool round.
///
/// Joins every non-empty text block of the turn with a space; falls back
/// to [`FALLBACK_MESSAGE`] when there is none, so raw tool errors never
/// reach the caller.
#[must_use]
pub fn fallback_text(blocks: &[ContentBlock]) -> String {
    let texts: Vec<&str> = blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        })
        .collect();

    if texts.is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        texts.join(" ")
    }
}
