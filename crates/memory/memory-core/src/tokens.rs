//! Token measure shared by budgeting and reporting.

/// Estimates the token count for a text string.
///
/// Rough approximation: 1 token ≈ 4 bytes of text, rounded up, minimum 1.
/// The short-term buffer uses this both for eviction and for `token_count`.
pub fn estimate_tokens(text: &str) -> usize {
    ((text.len() as f64) / 4.0).ceil().max(1.0) as usize
}
