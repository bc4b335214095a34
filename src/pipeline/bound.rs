//! Input bounding: cap extracted text at a fixed character budget.
//!
//! A plain prefix cut, counted in `char`s so a multi-byte character is never
//! split. No attempt is made to stop at a sentence or token boundary: the
//! budget bounds latency and cost deterministically, and whatever lies past
//! it is simply not seen by the model.

use tracing::debug;

/// Return the first `max_chars` characters of `text`.
pub fn bound_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            debug!(
                "Truncating text to {} characters (byte offset {})",
                max_chars, byte_idx
            );
            &text[..byte_idx]
        }
        None => text,
    }
}
