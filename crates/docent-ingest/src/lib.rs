//! Markdown discovery, parsing, and boundary-aware chunking.

pub mod boundary;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod splitter;
pub mod token;
pub mod types;

pub use error::IngestError;
pub use parser::MarkdownParser;
pub use pipeline::{BATCH_SIZE, IngestionPipeline, NoopObserver, ProgressObserver};
pub use splitter::{SplitterConfig, TextSplitter};
pub use token::TokenCounter;
pub use types::{
    Document, DocumentMetadata, IngestionProgress, IngestionResult, TextChunk, ValidationReport,
};
