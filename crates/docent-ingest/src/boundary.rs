//! Split-point detection for the chunk splitter.
//!
//! Each detector returns byte offsets positioned immediately after the
//! boundary it found, ordered ascending. Sentence boundaries outrank
//! paragraph boundaries, which outrank headings.

use std::sync::LazyLock;

use regex::Regex;

static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+.*$").unwrap());

const SENTENCE_PRIORITY: u8 = 3;
const PARAGRAPH_PRIORITY: u8 = 2;
const HEADING_PRIORITY: u8 = 1;

/// Offsets just past each sentence end (`.`, `!`, or `?` plus the
/// trailing whitespace run).
#[must_use]
pub fn sentence_boundaries(text: &str) -> Vec<usize> {
    SENTENCE_RE.find_iter(text).map(|m| m.end()).collect()
}

/// Offsets just past each blank line.
#[must_use]
pub fn paragraph_boundaries(text: &str) -> Vec<usize> {
    PARAGRAPH_RE.find_iter(text).map(|m| m.end()).collect()
}

/// Offsets at the end of each Markdown heading line, excluding its newline.
#[must_use]
pub fn heading_boundaries(text: &str) -> Vec<usize> {
    HEADING_RE.find_iter(text).map(|m| m.end()).collect()
}

/// Picks the best split offset within `text`, considering only boundaries
/// at offsets `<= max_offset`.
///
/// Highest priority wins; among equal priorities the largest offset wins.
/// Returns `None` when no boundary qualifies.
#[must_use]
pub fn optimal_split_point(text: &str, max_offset: usize) -> Option<usize> {
    let mut best: Option<(u8, usize)> = None;

    let candidates = SENTENCE_RE
        .find_iter(text)
        .map(|m| (m.end(), SENTENCE_PRIORITY))
        .chain(
            PARAGRAPH_RE
                .find_iter(text)
                .map(|m| (m.end(), PARAGRAPH_PRIORITY)),
        )
        .chain(
            HEADING_RE
                .find_iter(text)
                .map(|m| (m.end(), HEADING_PRIORITY)),
        );

    for (offset, priority) in candidates {
        if offset > max_offset {
            continue;
        }
        if best.is_none_or(|b| (priority, offset) > b) {
            best = Some((priority, offset));
        }
    }

    best.map(|(_, offset)| offset)
}
