//! Format adapters
//!
//! Each module turns one parsed HTML document into a [`ParsingResult`] for a
//! single format.

mod jsonld_extractor;
mod link_type_extractor;
mod microdata_extractor;
mod microformats_extractor;
mod rdfa_extractor;

pub use jsonld_extractor::*;
pub use link_type_extractor::*;
pub use microdata_extractor::*;
pub use microformats_extractor::*;
pub use rdfa_extractor::*;

use crate::error::{Error, Result};
use crate::factory::ParsingResult;
use crate::format::Format;
use crate::model::normalize_language;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracts the items of one format from a document
pub trait FormatParser {
    fn format(&self) -> Format;

    fn parse(&mut self, document: &Html) -> Result<ParsingResult>;
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| Error::Selector {
        selector: css.to_string(),
    })
}

/// Trimmed text content of an element
pub(crate) fn text_content(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Language of an element, inherited from the closest ancestor declaring one
pub(crate) fn language_of(element: &ElementRef) -> Option<String> {
    std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find_map(|el| el.value().attr("lang").or_else(|| el.value().attr("xml:lang")))
        .and_then(normalize_language)
}

/// Resolve a possibly relative URL against the document base
pub(crate) fn resolve_url(base: &Url, value: &str) -> String {
    let value = value.trim();
    base.join(value)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Whitespace separated tokens of an attribute
pub(crate) fn attr_tokens<'a>(element: &ElementRef<'a>, name: &str) -> Vec<&'a str> {
    element
        .value()
        .attr(name)
        .map(|v| v.split_ascii_whitespace().collect())
        .unwrap_or_default()
}

/// The document base: `<base href>` resolved against the document URL
pub fn document_base(document: &Html, url: &Url) -> Url {
    let Ok(base_selector) = selector("base[href]") else {
        return url.clone();
    };
    document
        .select(&base_selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| url.join(href.trim()).ok())
        .unwrap_or_else(|| url.clone())
}
