//! Top-level entry point
//!
//! A [`Parser`] owns everything that outlives one document: configuration,
//! logger, HTTP agent and the JSON-LD context cache. Each call to
//! [`Parser::extract`] runs the selected format adapters one after another and
//! concatenates their items in format order.

use crate::cache::{DocumentCache, MemoryCache};
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::extractors::{
    document_base, FormatParser, JsonLdExtractor, LinkTypeExtractor, MicrodataExtractor,
    MicroformatsExtractor, RdfaExtractor,
};
use crate::factory::ParsingResult;
use crate::fetch::{build_agent, fetch_text};
use crate::format::{Format, FormatSet};
use crate::jsonld::{CachedContextLoader, ContextLoader, HttpContextLoader, VocabularyCache};
use crate::logger::{SharedLogger, StrictLogger, TracingLogger};
use crate::model::ItemObjectModel;
use scraper::Html;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

const HTML_ACCEPT: &str = "text/html, application/xhtml+xml;q=0.9, */*;q=0.1";

pub struct Parser {
    config: ParserConfig,
    logger: SharedLogger,
    agent: ureq::Agent,
    jsonld: JsonLdExtractor,
}

impl Parser {
    /// Parser with the default logger, an in-memory context cache and, if
    /// enabled, network loading of JSON-LD contexts
    pub fn new(config: ParserConfig) -> Self {
        let logger: SharedLogger = if config.strict {
            Arc::new(StrictLogger::<TracingLogger>::default())
        } else {
            Arc::new(TracingLogger)
        };
        let agent = build_agent(&config);
        let contexts: Option<Box<dyn ContextLoader + Send>> = if config.fetch_contexts {
            Some(Box::new(HttpContextLoader::new(agent.clone())))
        } else {
            None
        };
        Self::assemble(config, logger, agent, Box::new(MemoryCache::new()), contexts)
    }

    /// Parser with explicit logger, cache backend and context loader.
    ///
    /// `contexts` is asked for JSON-LD contexts missing from `cache`; with
    /// `None` only cached contexts are used.
    pub fn with_parts(
        config: ParserConfig,
        logger: SharedLogger,
        cache: Box<dyn DocumentCache>,
        contexts: Option<Box<dyn ContextLoader + Send>>,
    ) -> Self {
        let agent = build_agent(&config);
        Self::assemble(config, logger, agent, cache, contexts)
    }

    fn assemble(
        config: ParserConfig,
        logger: SharedLogger,
        agent: ureq::Agent,
        cache: Box<dyn DocumentCache>,
        contexts: Option<Box<dyn ContextLoader + Send>>,
    ) -> Self {
        let loader = CachedContextLoader::new(contexts, cache);
        Self {
            jsonld: JsonLdExtractor::new(loader, logger.clone()),
            config,
            logger,
            agent,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Vocabularies collected from every JSON-LD context seen so far
    pub fn vocabulary(&self) -> &VocabularyCache {
        self.jsonld.vocabulary()
    }

    /// Extract the items of `formats` from a document.
    ///
    /// Without `source` the document is fetched from `uri`. Relative URLs
    /// resolve against `uri`, or the document's `<base href>` if it has one.
    pub fn extract(
        &mut self,
        uri: &str,
        source: Option<&str>,
        formats: FormatSet,
    ) -> Result<ItemObjectModel> {
        let url = Url::parse(uri).map_err(|e| Error::Url {
            url: uri.to_string(),
            message: e.to_string(),
        })?;

        let fetched;
        let source = match source {
            Some(source) => source,
            None => {
                fetched = fetch_text(&self.agent, uri, HTML_ACCEPT)?;
                fetched.as_str()
            }
        };

        let document = Html::parse_document(source);
        let base = document_base(&document, &url);

        let mut items = Vec::new();
        let mut rels = BTreeMap::new();
        let mut alternates = Vec::new();
        for format in formats.iter() {
            let result = match format {
                Format::Microformats => {
                    let mut extractor = MicroformatsExtractor::new(base.clone(), self.logger.clone());
                    let result = extractor.parse(&document)?;
                    (rels, alternates) = extractor.into_links();
                    result
                }
                Format::Microdata => self.run(MicrodataExtractor::new(base.clone(), self.logger.clone()), &document)?,
                Format::JsonLd => self.jsonld.parse(&document)?,
                Format::RdfaLite => self.run(RdfaExtractor::new(base.clone(), self.logger.clone()), &document)?,
                Format::LinkType => self.run(LinkTypeExtractor::new(base.clone(), self.logger.clone()), &document)?,
            };
            items.extend(result.into_items());
        }

        self.logger.debug(
            "extracted document",
            &[("uri", uri), ("items", items.len().to_string().as_str())],
        )?;
        Ok(ItemObjectModel::new(items, rels, alternates))
    }

    /// Extract with the formats selected in the configuration
    pub fn extract_configured(&mut self, uri: &str, source: Option<&str>) -> Result<ItemObjectModel> {
        let formats = self.config.formats;
        self.extract(uri, source, formats)
    }

    fn run(&self, mut extractor: impl FormatParser, document: &Html) -> Result<ParsingResult> {
        extractor.parse(document)
    }
}
