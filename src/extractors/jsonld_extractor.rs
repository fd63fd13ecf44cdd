//! JSON-LD extraction from HTML
//!
//! Extracts JSON-LD data from <script type="application/ld+json"> tags.
//! Every script is decoded on its own; a broken script is reported and skipped.

use crate::error::Result;
use crate::extractors::{selector, FormatParser};
use crate::factory::{Diagnostic, ParsingResult, RawItem, RawValue};
use crate::format::Format;
use crate::jsonld::{CachedContextLoader, GraphResolver, Node, NodeValue, VocabularyCache};
use crate::logger::SharedLogger;
use crate::model::normalize_language;
use scraper::Html;
use serde_json::Value as JsonValue;

pub struct JsonLdExtractor {
    loader: CachedContextLoader,
    logger: SharedLogger,
}

impl JsonLdExtractor {
    /// The loader and its vocabulary cache live as long as the extractor, so
    /// documents sharing a context only fetch it once.
    pub fn new(loader: CachedContextLoader, logger: SharedLogger) -> Self {
        Self { loader, logger }
    }

    pub fn loader(&self) -> &CachedContextLoader {
        &self.loader
    }

    pub fn vocabulary(&self) -> &VocabularyCache {
        self.loader.vocabulary()
    }

    /// Items of one decoded script
    fn script_items(&mut self, json: &JsonValue, subject: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<RawItem> {
        let roots = match json {
            JsonValue::Array(roots) => roots.as_slice(),
            JsonValue::Object(_) => std::slice::from_ref(json),
            _ => {
                diagnostics.push(Diagnostic::new(subject, "not a JSON object or array"));
                return Vec::new();
            }
        };

        let mut items = Vec::new();
        for (i, root) in roots.iter().enumerate() {
            let nodes = match GraphResolver::new(&mut self.loader).resolve(root) {
                Ok(nodes) => nodes,
                Err(e) => {
                    diagnostics.push(Diagnostic::new(format!("{} root #{}", subject, i), e.to_string()));
                    continue;
                }
            };
            // Only the first node of a graph becomes an item
            if let Some(node) = nodes.into_iter().next() {
                items.push(node_item(node, self.loader.vocabulary()));
            }
        }
        items
    }
}

impl FormatParser for JsonLdExtractor {
    fn format(&self) -> Format {
        Format::JsonLd
    }

    fn parse(&mut self, document: &Html) -> Result<ParsingResult> {
        let scripts = selector(r#"script[type="application/ld+json"]"#)?;

        let mut items = Vec::new();
        let mut diagnostics = Vec::new();
        for (i, element) in document.select(&scripts).enumerate() {
            let content = element.text().collect::<String>();
            let trimmed = content.trim();
            if trimmed.is_empty() {
                continue;
            }

            let subject = format!("script #{}", i);
            match serde_json::from_str::<JsonValue>(trimmed) {
                Ok(json) => items.extend(self.script_items(&json, &subject, &mut diagnostics)),
                Err(e) => diagnostics.push(Diagnostic::new(subject, e.to_string())),
            }
        }

        self.logger.debug(
            "json-ld items",
            &[
                ("count", items.len().to_string().as_str()),
                ("context_fetches", self.loader.fetches().to_string().as_str()),
            ],
        )?;
        ParsingResult::new(Format::JsonLd, items, diagnostics, &*self.logger)
    }
}

/// Convert a resolved node, expanding names through the vocabulary cache
pub fn node_item(node: Node, vocabulary: &VocabularyCache) -> RawItem {
    let mut item = RawItem {
        types: node
            .types
            .first()
            .map(|t| vec![vocabulary.expand_iri(t)])
            .unwrap_or_default(),
        id: node.id,
        ..Default::default()
    };

    for (name, values) in node.properties {
        let iri = vocabulary.expand_iri(&name);
        for value in values {
            if let Some(value) = node_value(value, vocabulary) {
                item.push_property(iri.clone(), value);
            }
        }
    }
    item
}

fn node_value(value: NodeValue, vocabulary: &VocabularyCache) -> Option<RawValue> {
    match value {
        NodeValue::Literal { value, language, .. } => Some(RawValue::Text {
            text: value,
            language: language.as_deref().and_then(normalize_language),
        }),
        NodeValue::Node(node) if node.types.is_empty() => node.id.map(RawValue::text),
        NodeValue::Node(node) => Some(RawValue::Item(node_item(node, vocabulary))),
    }
}
