//! Markdown document discovery and parsing.
//!
//! Documents are located by recursive glob under a docs root, YAML
//! front-matter is lifted into [`DocumentMetadata`], and the Markdown body
//! is rendered to plain text with code content removed.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;

use crate::error::IngestError;
use crate::types::{Document, DocumentMetadata};

static FRONT_MATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\s*\n(.*?)\n---\s*\n").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

const FALLBACK_TITLE: &str = "Untitled Document";

pub struct MarkdownParser {
    docs_path: PathBuf,
}

impl MarkdownParser {
    #[must_use]
    pub fn new(docs_path: impl Into<PathBuf>) -> Self {
        Self {
            docs_path: docs_path.into(),
        }
    }

    #[must_use]
    pub fn docs_path(&self) -> &Path {
        &self.docs_path
    }

    /// Finds every `.md` and `.mdx` file under the docs root, sorted
    /// lexicographically.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::DocsPathNotFound`] when the root is missing
    /// and [`IngestError::Pattern`] when a glob pattern cannot be built
    /// from it.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, IngestError> {
        if !self.docs_path.exists() {
            return Err(IngestError::DocsPathNotFound(self.docs_path.clone()));
        }

        let mut files = Vec::new();
        for pattern in ["**/*.md", "**/*.mdx"] {
            let full = self.docs_path.join(pattern);
            let paths = glob::glob(&full.to_string_lossy())
                .map_err(|e| IngestError::Pattern(e.to_string()))?;
            files.extend(paths.filter_map(Result::ok));
        }

        files.sort();
        Ok(files)
    }

    /// Reads and parses one file, returning `None` (with a warning logged)
    /// when it cannot be read.
    pub async fn parse_file(&self, path: &Path) -> Option<Document> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Some(self.parse_source(path, &raw)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                None
            }
        }
    }

    /// Discovers and parses all documents, skipping files that fail to
    /// parse.
    ///
    /// # Errors
    ///
    /// Only discovery can fail; see [`Self::discover_files`].
    pub async fn parse_all(&self) -> Result<Vec<Document>, IngestError> {
        let files = self.discover_files()?;
        let mut documents = Vec::with_capacity(files.len());

        for path in &files {
            if let Some(doc) = self.parse_file(path).await {
                documents.push(doc);
            }
        }

        Ok(documents)
    }

    fn parse_source(&self, path: &Path, raw: &str) -> Document {
        let front = parse_front_matter(raw);

        let title = front_str(&front, "title")
            .map_or_else(|| title_from_content(raw), str::to_owned);
        let category = front_str(&front, "sidebar_label")
            .or_else(|| front_str(&front, "category"))
            .map(str::to_owned);
        let tags = front_tags(&front);
        let author = front_str(&front, "author").map(str::to_owned);

        let relative = path.strip_prefix(&self.docs_path).unwrap_or(path);

        Document {
            content: markdown_to_text(raw),
            metadata: DocumentMetadata {
                title,
                path: relative.to_string_lossy().into_owned(),
                category,
                tags,
                author,
            },
            raw_markdown: raw.to_owned(),
        }
    }
}

impl std::fmt::Debug for MarkdownParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownParser")
            .field("docs_path", &self.docs_path)
            .finish()
    }
}

/// Renders Markdown to plain text: front-matter stripped, code blocks and
/// inline code dropped, blank-line runs collapsed to one blank line.
#[must_use]
pub fn markdown_to_text(markdown: &str) -> String {
    let body = FRONT_MATTER_RE.replace(markdown, "");
    let mut text = String::with_capacity(body.len());
    let mut in_code_block = false;

    for event in Parser::new(&body) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(t) => {
                if !in_code_block {
                    text.push_str(&t);
                }
            }
            Event::End(TagEnd::Paragraph | TagEnd::Heading { .. }) => text.push_str("\n\n"),
            Event::End(TagEnd::Item) | Event::SoftBreak | Event::HardBreak => text.push('\n'),
            _ => {}
        }
    }

    BLANK_RUN_RE.replace_all(text.trim(), "\n\n").into_owned()
}

fn parse_front_matter(content: &str) -> serde_yaml::Value {
    let Some(caps) = FRONT_MATTER_RE.captures(content) else {
        return serde_yaml::Value::Null;
    };
    serde_yaml::from_str(&caps[1]).unwrap_or(serde_yaml::Value::Null)
}

fn front_str<'a>(front: &'a serde_yaml::Value, key: &str) -> Option<&'a str> {
    front
        .get(key)
        .and_then(serde_yaml::Value::as_str)
        .filter(|s| !s.is_empty())
}

fn front_tags(front: &serde_yaml::Value) -> Vec<String> {
    match front.get("tags") {
        Some(serde_yaml::Value::Sequence(seq)) => seq
            .iter()
            .filter_map(serde_yaml::Value::as_str)
            .map(str::to_owned)
            .collect(),
        Some(serde_yaml::Value::String(s)) => {
            s.split(',').map(|tag| tag.trim().to_owned()).collect()
        }
        _ => Vec::new(),
    }
}

fn title_from_content(raw: &str) -> String {
    raw.lines()
        .find_map(|line| line.trim().strip_prefix("# "))
        .map_or_else(|| FALLBACK_TITLE.to_owned(), |rest| rest.trim().to_owned())
}
