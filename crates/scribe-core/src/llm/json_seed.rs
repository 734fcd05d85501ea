//! Best-effort JSON mode for backends without a native format flag.
//!
//! The adapter appends an assistant turn containing [`JSON_SEED`], so the
//! model continues an object that has already been opened. The backend only
//! returns the continuation, so the seed is put back on the caller-visible
//! text. Some backends echo the prefilled turn; the seed is stripped first in
//! that case so it never appears twice.
//!
//! This is a nudge, not a guarantee: callers must still validate the JSON.

use futures_util::StreamExt;

use super::provider::TextStream;

/// Opening token used to seed the assistant turn.
pub const JSON_SEED: &str = "{\"";

/// Put the seed back on a complete response.
pub fn reattach_seed(seed: &str, response: &str) -> String {
    let body = response.strip_prefix(seed).unwrap_or(response);
    format!("{seed}{body}")
}

/// Streaming counterpart of [`reattach_seed`].
///
/// Buffers only until it can tell whether the backend echoed the seed, then
/// passes fragments through untouched. Concatenating the output equals
/// `reattach_seed(seed, <concatenated input>)`.
pub fn seeded_stream(seed: &'static str, inner: TextStream) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut inner = inner;
        let mut head = String::new();
        let mut decided = false;

        while let Some(item) = inner.next().await {
            let fragment = match item {
                Ok(fragment) => fragment,
                Err(e) => {
                    yield Err(e);
                    continue;
                }
            };
            if decided {
                yield Ok(fragment);
                continue;
            }

            head.push_str(&fragment);
            if head.len() < seed.len() && seed.starts_with(head.as_str()) {
                continue;
            }
            decided = true;
            yield Ok(reattach_seed(seed, &head));
        }

        if !decided {
            yield Ok(reattach_seed(seed, &head));
        }
    })
}
