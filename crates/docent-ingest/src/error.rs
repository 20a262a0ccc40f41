use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("docs path does not exist: {}", .0.display())]
    DocsPathNotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("glob pattern error: {0}")]
    Pattern(String),

    #[error("tokenizer initialization failed: {0}")]
    Tokenizer(String),
}
