//! Microformats extraction
//!
//! Runs a [`MicroformatsEngine`] and maps its parse tree onto items under the
//! microformats profile. The document's `rel` links and alternates are kept
//! for the item object model.

use crate::error::Result;
use crate::extractors::FormatParser;
use crate::factory::{ParsingResult, RawItem, RawValue};
use crate::format::Format;
use crate::logger::SharedLogger;
use crate::microformats::{Document, Mf2Engine, Mf2Item, MicroformatsEngine, PropertyValue};
use crate::model::{AlternateResource, Iri, RelValue, MICROFORMATS_PROFILE};
use scraper::Html;
use std::collections::BTreeMap;
use url::Url;

pub struct MicroformatsExtractor {
    base: Url,
    logger: SharedLogger,
    engine: Box<dyn MicroformatsEngine>,
    rels: BTreeMap<String, Vec<RelValue>>,
    alternates: Vec<AlternateResource>,
}

impl MicroformatsExtractor {
    pub fn new(base: Url, logger: SharedLogger) -> Self {
        Self::with_engine(base, logger, Box::new(Mf2Engine))
    }

    pub fn with_engine(base: Url, logger: SharedLogger, engine: Box<dyn MicroformatsEngine>) -> Self {
        Self {
            base,
            logger,
            engine,
            rels: BTreeMap::new(),
            alternates: Vec::new(),
        }
    }

    /// `rel` declarations of the last parsed document
    pub fn rels(&self) -> &BTreeMap<String, Vec<RelValue>> {
        &self.rels
    }

    /// Alternate resources of the last parsed document
    pub fn alternates(&self) -> &[AlternateResource] {
        &self.alternates
    }

    pub fn into_links(self) -> (BTreeMap<String, Vec<RelValue>>, Vec<AlternateResource>) {
        (self.rels, self.alternates)
    }

    fn keep_links(&mut self, parsed: &Document) {
        self.rels = parsed
            .rels
            .iter()
            .map(|(rel, urls)| (rel.clone(), urls.iter().map(RelValue::new).collect()))
            .collect();
        self.alternates = parsed
            .alternates
            .iter()
            .map(|alt| AlternateResource {
                url: alt.url.clone(),
                media_type: alt.media_type.clone(),
                media: alt.media.clone(),
                hreflang: alt.hreflang.clone(),
                title: alt.title.clone(),
            })
            .collect();
    }
}

impl FormatParser for MicroformatsExtractor {
    fn format(&self) -> Format {
        Format::Microformats
    }

    fn parse(&mut self, document: &Html) -> Result<ParsingResult> {
        let parsed = self.engine.parse(document, &self.base);
        self.keep_links(&parsed);

        let items: Vec<RawItem> = parsed.items.into_iter().map(raw_item).collect();
        self.logger.debug(
            "microformats items",
            &[
                ("count", items.len().to_string().as_str()),
                ("rels", self.rels.len().to_string().as_str()),
            ],
        )?;
        ParsingResult::new(Format::Microformats, items, Vec::new(), &*self.logger)
    }
}

fn mf(name: &str) -> Iri {
    Iri::new(MICROFORMATS_PROFILE, name)
}

fn raw_item(item: Mf2Item) -> RawItem {
    let mut raw = RawItem {
        types: item.types.iter().map(|t| mf(t)).collect(),
        id: item.id,
        language: item.lang,
        value: item.value,
        children: item.children.into_iter().map(raw_item).collect(),
        ..Default::default()
    };
    for (name, values) in item.properties {
        let iri = mf(&name);
        for value in values {
            raw.push_property(iri.clone(), raw_value(value));
        }
    }
    raw
}

fn raw_value(value: PropertyValue) -> RawValue {
    match value {
        PropertyValue::Text(text) => RawValue::text(text),
        PropertyValue::Html { html, value } => RawValue::Alternates(vec![
            ("html".to_string(), RawValue::text(html)),
            ("value".to_string(), RawValue::text(value)),
        ]),
        PropertyValue::Item(item) => RawValue::Item(raw_item(item)),
    }
}
