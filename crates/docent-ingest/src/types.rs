use std::collections::HashMap;

/// Metadata extracted from a document's front-matter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    /// Path relative to the docs root.
    pub path: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
}

/// A parsed document: plain-text body plus the original Markdown source.
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
    pub raw_markdown: String,
}

/// A bounded piece of document text sized for token-limited consumers.
///
/// `start_position` and `end_position` are running offsets over the chunked
/// output with the overlap subtracted between chunks; trimming and boundary
/// splits make them approximate rather than exact source offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub content: String,
    /// Formatted as `"{document_path}#chunk-{index}"`.
    pub chunk_id: String,
    pub document_path: String,
    pub start_position: usize,
    pub end_position: usize,
    pub metadata: HashMap<String, String>,
    pub token_count: usize,
}

/// Aggregate outcome of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestionResult {
    pub documents_processed: usize,
    pub chunks_created: usize,
    pub total_tokens: usize,
    pub errors: Vec<String>,
    pub success: bool,
}

/// Snapshot passed to a progress observer during ingestion.
#[derive(Debug, Clone)]
pub struct IngestionProgress {
    pub current_document: usize,
    pub total_documents: usize,
    pub current_chunk: usize,
    pub total_chunks: usize,
    pub status: String,
}

/// Quality summary over a set of chunks.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub total_chunks: usize,
    pub empty_chunks: usize,
    pub oversized_chunks: usize,
    pub average_chunk_size: f64,
    pub average_tokens: f64,
    /// Chunk counts bucketed by character length, keyed on `(len / 100) * 100`.
    pub chunk_size_distribution: HashMap<usize, usize>,
    pub warnings: Vec<String>,
}
