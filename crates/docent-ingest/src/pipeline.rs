//! Discovery → parse → chunk → aggregate orchestration.

use std::collections::HashMap;
use std::path::PathBuf;

use futures::future::join_all;

use crate::error::IngestError;
use crate::parser::MarkdownParser;
use crate::splitter::{SplitterConfig, TextSplitter};
use crate::types::{
    Document, DocumentMetadata, IngestionProgress, IngestionResult, TextChunk, ValidationReport,
};

/// Receives progress snapshots during an ingestion run.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &IngestionProgress);
}

/// Observer that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _progress: &IngestionProgress) {}
}

/// Documents per concurrently-processed batch.
pub const BATCH_SIZE: usize = 10;

pub struct IngestionPipeline {
    parser: MarkdownParser,
    splitter: TextSplitter,
}

impl IngestionPipeline {
    /// # Errors
    ///
    /// Returns [`IngestError::Tokenizer`] when the token vocabulary cannot
    /// be loaded.
    pub fn new(
        docs_path: impl Into<PathBuf>,
        config: SplitterConfig,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            parser: MarkdownParser::new(docs_path),
            splitter: TextSplitter::new(config)?,
        })
    }

    #[must_use]
    pub fn parser(&self) -> &MarkdownParser {
        &self.parser
    }

    #[must_use]
    pub fn splitter(&self) -> &TextSplitter {
        &self.splitter
    }

    /// Chunks one parsed document, carrying its metadata into every chunk.
    #[must_use]
    pub fn process_document(&self, document: &Document) -> Vec<TextChunk> {
        let metadata = flatten_metadata(&document.metadata);
        let chunks =
            self.splitter
                .chunk_document(&document.content, &document.metadata.path, &metadata);
        tracing::info!(
            title = %document.metadata.title,
            chunks = chunks.len(),
            "processed document"
        );
        chunks
    }

    /// Processes documents in batches, fanning each batch out concurrently.
    pub async fn process_documents_batch(
        &self,
        documents: &[Document],
        batch_size: usize,
    ) -> Vec<TextChunk> {
        let batch_size = batch_size.max(1);
        let total_batches = documents.len().div_ceil(batch_size);
        let mut all_chunks = Vec::new();

        for (index, batch) in documents.chunks(batch_size).enumerate() {
            tracing::info!("Processing batch {} of {}", index + 1, total_batches);

            let tasks: Vec<_> = batch
                .iter()
                .map(|doc| async move { self.process_document(doc) })
                .collect();
            for chunks in join_all(tasks).await {
                all_chunks.extend(chunks);
            }
        }

        all_chunks
    }

    /// Runs the full pipeline and aggregates counts.
    ///
    /// Never fails outright: an empty corpus or a missing docs root is
    /// reported through `success` and `errors` on the result.
    pub async fn run_ingestion(&self, observer: &dyn ProgressObserver) -> IngestionResult {
        tracing::info!("starting document discovery and parsing");

        let documents = match self.parser.parse_all().await {
            Ok(documents) => documents,
            Err(e) => {
                let message = format!("Ingestion pipeline failed: {e}");
                tracing::error!("{message}");
                return IngestionResult {
                    documents_processed: 0,
                    chunks_created: 0,
                    total_tokens: 0,
                    errors: vec![message],
                    success: false,
                };
            }
        };

        if documents.is_empty() {
            return IngestionResult {
                documents_processed: 0,
                chunks_created: 0,
                total_tokens: 0,
                errors: vec!["No documents found to process".to_owned()],
                success: false,
            };
        }

        tracing::info!(total = documents.len(), "found documents to process");

        observer.on_progress(&IngestionProgress {
            current_document: 0,
            total_documents: documents.len(),
            current_chunk: 0,
            total_chunks: 0,
            status: "Processing documents...".to_owned(),
        });

        let chunks = self.process_documents_batch(&documents, BATCH_SIZE).await;
        let total_tokens = chunks.iter().map(|c| c.token_count).sum();

        tracing::info!(
            documents = documents.len(),
            chunks = chunks.len(),
            total_tokens,
            "ingestion complete"
        );

        IngestionResult {
            documents_processed: documents.len(),
            chunks_created: chunks.len(),
            total_tokens,
            errors: Vec::new(),
            success: true,
        }
    }

    /// Summarizes chunk quality: counts, averages, a 100-char size
    /// histogram, and human-readable warnings.
    ///
    /// Empty chunks are excluded from the sums and the histogram, but the
    /// averages divide by the full chunk count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn validate_ingestion(&self, chunks: &[TextChunk]) -> ValidationReport {
        let mut report = ValidationReport {
            total_chunks: chunks.len(),
            ..ValidationReport::default()
        };

        if chunks.is_empty() {
            report.warnings.push("No chunks to validate".to_owned());
            return report;
        }

        let oversized_limit = self.splitter.config().chunk_size * 3 / 2;
        let mut total_chars = 0usize;
        let mut total_tokens = 0usize;

        for chunk in chunks {
            if chunk.content.trim().is_empty() {
                report.empty_chunks += 1;
                continue;
            }

            let size = chunk.content.len();
            total_chars += size;
            total_tokens += chunk.token_count;

            if size > oversized_limit {
                report.oversized_chunks += 1;
            }

            *report
                .chunk_size_distribution
                .entry((size / 100) * 100)
                .or_insert(0) += 1;
        }

        report.average_chunk_size = total_chars as f64 / chunks.len() as f64;
        report.average_tokens = total_tokens as f64 / chunks.len() as f64;

        if report.empty_chunks > 0 {
            report
                .warnings
                .push(format!("Found {} empty chunks", report.empty_chunks));
        }
        if report.oversized_chunks > 0 {
            report
                .warnings
                .push(format!("Found {} oversized chunks", report.oversized_chunks));
        }

        report
    }
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("parser", &self.parser)
            .field("splitter", &self.splitter)
            .finish()
    }
}

fn flatten_metadata(metadata: &DocumentMetadata) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("title".to_owned(), metadata.title.clone());
    if let Some(category) = &metadata.category {
        map.insert("category".to_owned(), category.clone());
    }
    if !metadata.tags.is_empty() {
        map.insert("tags".to_owned(), metadata.tags.join(", "));
    }
    if let Some(author) = &metadata.author {
        map.insert("author".to_owned(), author.clone());
    }
    map
}
