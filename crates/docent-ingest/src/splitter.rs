use std::collections::HashMap;

use crate::boundary;
use crate::error::IngestError;
use crate::token::TokenCounter;
use crate::types::TextChunk;

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Boundary-aware text splitter with configurable size and overlap.
///
/// Targets `chunk_size` bytes per chunk, preferring to cut at sentence,
/// paragraph, or heading boundaries near the target, falling back to the
/// last word break past half the target, and finally to a hard cut. The
/// trailing `chunk_overlap` bytes of each chunk are repeated at the start
/// of the next one.
pub struct TextSplitter {
    config: SplitterConfig,
    tokens: TokenCounter,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns [`IngestError::Tokenizer`] when the token vocabulary cannot
    /// be loaded.
    pub fn new(config: SplitterConfig) -> Result<Self, IngestError> {
        Ok(Self {
            config,
            tokens: TokenCounter::new()?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokens.count(text)
    }

    /// Splits `text` into trimmed, non-empty chunks.
    ///
    /// Whitespace-only input produces no chunks. Progress is forced when
    /// the overlap would step back to or before the current start, so
    /// `chunk_overlap >= chunk_size` still terminates.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chunk_size = self.config.chunk_size.max(1);
        let len = text.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let mut end = ceil_char_boundary(text, (start + chunk_size).min(len));

            if end < len {
                // Look a little past the target so matches straddling the
                // cut are seen whole (and rejected by the offset filter)
                // instead of matching short against the window edge.
                let window_end = floor_char_boundary(text, (end + 100).min(len));

                if let Some(point) = boundary::optimal_split_point(&text[start..window_end], chunk_size)
                {
                    end = start + point;
                } else if let Some(last_space) = text[start..end].rfind(' ')
                    && last_space > chunk_size / 2
                {
                    end = start + last_space;
                }
            }

            let chunk = text[start..end].trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_owned());
            }

            let mut next_start = end.saturating_sub(self.config.chunk_overlap);
            if next_start <= start {
                next_start = end;
            }
            start = ceil_char_boundary(text, next_start);
        }

        chunks
    }

    /// Splits a document and wraps each piece in a [`TextChunk`].
    ///
    /// Positions are running offsets with the overlap subtracted between
    /// consecutive chunks; they drift from true source offsets once
    /// trimming or boundary cuts shorten a chunk, and that bookkeeping is
    /// intentional.
    #[must_use]
    pub fn chunk_document(
        &self,
        content: &str,
        document_path: &str,
        metadata: &HashMap<String, String>,
    ) -> Vec<TextChunk> {
        let pieces = self.split(content);
        let total = pieces.len();

        let mut chunks = Vec::with_capacity(total);
        let mut cursor = 0usize;

        for (i, piece) in pieces.into_iter().enumerate() {
            let start_position = cursor;
            let end_position = start_position + piece.len();

            let mut chunk_metadata = metadata.clone();
            chunk_metadata.insert("chunk_index".to_owned(), i.to_string());
            chunk_metadata.insert("total_chunks".to_owned(), total.to_string());

            chunks.push(TextChunk {
                chunk_id: format!("{document_path}#chunk-{i}"),
                document_path: document_path.to_owned(),
                start_position,
                end_position,
                metadata: chunk_metadata,
                token_count: self.tokens.count(&piece),
                content: piece,
            });

            cursor = end_position.saturating_sub(self.config.chunk_overlap);
        }

        chunks
    }
}

impl std::fmt::Debug for TextSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSplitter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
