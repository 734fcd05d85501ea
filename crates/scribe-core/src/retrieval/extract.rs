//! Per-source text extraction under a token budget.

/// Characters that fit in `ntokens` tokens, using the 4 chars/token rule.
pub fn ntokens_to_nchars(ntokens: usize) -> usize {
    ntokens.saturating_mul(4)
}

/// Rough token count (`chars / 4`), for when no tokenizer is at hand.
pub fn quick_token_estimate(text: &str) -> usize {
    text.chars().count() / 4
}

/// Take `max_chars` characters from the middle of `text`.
///
/// The slice starts at `max(0, T/2 - C/2)` and runs for `min(C, T - start)`
/// characters, where `T` is the character length and `C` the cap. Counting is
/// in chars, not bytes, so multi-byte text is never split mid-codepoint.
pub fn centered_slice(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    let start = (total / 2).saturating_sub(max_chars / 2);
    let len = max_chars.min(total - start);
    text.chars().skip(start).take(len).collect()
}

/// Concatenate the longest prefix of `chunks` whose token total fits `budget`.
///
/// Stops at the first chunk that would overflow, even if a later one is
/// small enough to fit. The result is also capped at
/// `ntokens_to_nchars(budget)` characters, which stops accumulation the same
/// way.
pub fn accumulate_chunks<F>(chunks: &[String], budget: usize, mut estimate: F) -> String
where
    F: FnMut(&str) -> usize,
{
    let max_chars = ntokens_to_nchars(budget);
    let mut used_tokens = 0_usize;
    let mut used_chars = 0_usize;
    let mut text = String::new();
    for chunk in chunks {
        let tokens = estimate(chunk);
        let chars = chunk.chars().count();
        if used_tokens + tokens > budget || used_chars + chars > max_chars {
            break;
        }
        used_tokens += tokens;
        used_chars += chars;
        text.push_str(chunk);
    }
    text
}
