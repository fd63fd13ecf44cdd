//! RDFa Lite
//!
//! Reads the five RDFa Lite attributes (`vocab`, `typeof`, `property`,
//! `resource` and `prefix`) into items. Elements with `typeof` start a new
//! item; `property` adds a value to the closest enclosing item.
//!
//! Reference: https://www.w3.org/TR/rdfa-lite/

mod engine;

pub use engine::RdfaLiteEngine;

use crate::factory::RawItem;
use scraper::Html;
use url::Url;

/// Produces the RDFa items of a document
pub trait RdfaEngine {
    fn parse(&self, document: &Html, base: &Url) -> Vec<RawItem>;
}
