//! GPT-2 BPE token counting.

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use scribe_core::retrieval::TokenEstimator;
use scribe_types::retrieval::RetrievalError;

/// [`TokenEstimator`] over the GPT-2 (`r50k_base`) vocabulary.
#[derive(Clone)]
pub struct Gpt2TokenEstimator {
    bpe: Arc<CoreBPE>,
}

impl Gpt2TokenEstimator {
    pub fn new() -> Result<Self, RetrievalError> {
        let bpe = tiktoken_rs::r50k_base()
            .map_err(|e| RetrievalError::Tokenizer(format!("failed to load r50k_base: {e}")))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl TokenEstimator for Gpt2TokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_tokens() {
        let estimator = Gpt2TokenEstimator::new().unwrap();
        assert_eq!(estimator.estimate(""), 0);
        assert_eq!(estimator.estimate("hello world"), 2);
    }

    #[test]
    fn test_longer_text_costs_more() {
        let estimator = Gpt2TokenEstimator::new().unwrap();
        let short = estimator.estimate("The borrow checker");
        let long = estimator.estimate("The borrow checker enforces aliasing rules at compile time.");
        assert!(long > short);
    }
}
