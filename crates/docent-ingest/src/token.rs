use tiktoken_rs::CoreBPE;

use crate::error::IngestError;

/// Token counter over the `cl100k_base` encoding, the table the hosted
/// chat models bill against.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Loads the `cl100k_base` vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Tokenizer`] when the embedded vocabulary data
    /// cannot be decoded.
    pub fn new() -> Result<Self, IngestError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| IngestError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter").finish_non_exhaustive()
    }
}
