//! Text normalization and content addressing for feed blocks.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d[\d,]*").unwrap());

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_line(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Dedup key for a report block: hex SHA-256 over the case-folded,
/// whitespace-collapsed text. Byte-different re-renders of the same report
/// (padding, casing) hash identically; two reports with literally identical
/// text merge into one event.
pub fn content_hash(block: &str) -> String {
    let folded = normalize_line(block).to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(folded.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pull the first integer out of free text, tolerating thousands separators
/// and a leading sign. `None` when no number is present, so zero and
/// "no data" stay distinguishable downstream.
pub fn parse_number(text: &str) -> Option<i64> {
    let matched = NUMBER_RE.find(text)?;
    matched.as_str().replace(',', "").parse().ok()
}
