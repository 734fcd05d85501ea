//! Safe retrieval budget for a model's context window.
//!
//! Works like tax brackets: each slice of the raw context window keeps a
//! different fraction, and everything past the last boundary keeps the last
//! bracket's fraction. The result is the token allowance the chunk assembler
//! divides across sources; the remainder is headroom for prompt scaffolding
//! and the model's own response.
//!
//! | raw tokens        | kept |
//! |-------------------|------|
//! | 0 - 5,000         | 50%  |
//! | 5,000 - 10,000    | 90%  |
//! | 10,000 - 32,000   | 75%  |
//! | 32,000 - 100,000  | 50%  |
//! | beyond 100,000    | 50%  |

use scribe_types::llm::CapabilityDescriptor;

/// `(upper bound, fraction kept)` in ascending order.
const BRACKETS: [(u32, f64); 4] = [(5_000, 0.5), (10_000, 0.9), (32_000, 0.75), (100_000, 0.5)];

/// Convert a raw context length (tokens) into a safe retrieval budget.
///
/// Halves are rounded to even, so odd 50% slices never push the budget
/// above the exact bracket sum by more than half a token.
pub fn safe_retrieval_budget(context_length: u32) -> u32 {
    let mut remaining = i64::from(context_length);
    let mut budget = 0.0_f64;
    let mut lower = 0_u32;

    for (upper, rate) in BRACKETS {
        let width = i64::from(upper - lower);
        let consumed = remaining.min(width);
        budget += consumed as f64 * rate;
        remaining -= width;
        lower = upper;
        if remaining <= 0 {
            break;
        }
    }

    if remaining > 0 {
        let (_, last_rate) = BRACKETS[BRACKETS.len() - 1];
        budget += remaining as f64 * last_rate;
    }

    budget.round_ties_even() as u32
}

/// Safe retrieval budget for a model.
pub fn budget_for(descriptor: &CapabilityDescriptor) -> u32 {
    safe_retrieval_budget(descriptor.context_length)
}
