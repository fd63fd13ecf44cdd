//! JSON-LD node resolution and vocabulary caching
//!
//! [`graph`] turns raw JSON into typed nodes, loading `@context` documents
//! through a [`ContextLoader`]. [`CachedContextLoader`] sits in front of the
//! real loader and feeds every context it sees into a [`VocabularyCache`],
//! which later expands full IRIs into profiled names.

mod context;
mod graph;
mod vocabulary;

pub use context::*;
pub use graph::*;
pub use vocabulary::*;

/// Split a compact IRI like `schema:name` into `("schema", "name")`.
///
/// Absolute IRIs (`http://...`) and strings without a colon are not compact.
pub fn parse_prefix(s: &str) -> Option<(&str, &str)> {
    let colon_pos = s.find(':')?;
    let prefix = &s[..colon_pos];
    let suffix = &s[colon_pos + 1..];

    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

/// Whether the IRI starts with an RFC 3986 scheme
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(colon_pos) => {
            let scheme = &iri[..colon_pos];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}
