//! RDFa Lite extraction

use crate::error::Result;
use crate::extractors::FormatParser;
use crate::factory::ParsingResult;
use crate::format::Format;
use crate::logger::SharedLogger;
use crate::rdfa::{RdfaEngine, RdfaLiteEngine};
use scraper::Html;
use url::Url;

pub struct RdfaExtractor {
    base: Url,
    logger: SharedLogger,
    engine: Box<dyn RdfaEngine>,
}

impl RdfaExtractor {
    pub fn new(base: Url, logger: SharedLogger) -> Self {
        Self::with_engine(base, logger, Box::new(RdfaLiteEngine))
    }

    pub fn with_engine(base: Url, logger: SharedLogger, engine: Box<dyn RdfaEngine>) -> Self {
        Self { base, logger, engine }
    }
}

impl FormatParser for RdfaExtractor {
    fn format(&self) -> Format {
        Format::RdfaLite
    }

    fn parse(&mut self, document: &Html) -> Result<ParsingResult> {
        let items = self.engine.parse(document, &self.base);
        self.logger.debug("rdfa items", &[("count", items.len().to_string().as_str())])?;
        ParsingResult::new(Format::RdfaLite, items, Vec::new(), &*self.logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::RawItem;
    use crate::logger::TracingLogger;
    use crate::model::Iri;
    use std::sync::Arc;

    struct Fixed;

    impl RdfaEngine for Fixed {
        fn parse(&self, _document: &Html, _base: &Url) -> Vec<RawItem> {
            vec![
                RawItem {
                    types: vec![Iri::new("http://schema.org/", "Thing")],
                    ..Default::default()
                },
                RawItem::default(),
            ]
        }
    }

    #[test]
    fn test_items_are_tagged_and_validated() {
        let base = Url::parse("https://example.com/").unwrap();
        let mut extractor = RdfaExtractor::with_engine(base, Arc::new(TracingLogger), Box::new(Fixed));
        let result = extractor.parse(&Html::parse_document("<p></p>")).unwrap();
        assert_eq!(result.format(), Format::RdfaLite);
        assert_eq!(result.items().len(), 1);
        assert_eq!(result.items()[0].format(), Format::RdfaLite);
        assert_eq!(result.diagnostics().len(), 1);
    }

    #[test]
    fn test_default_engine() {
        let base = Url::parse("https://example.com/").unwrap();
        let mut extractor = RdfaExtractor::new(base, Arc::new(TracingLogger));
        let html = r#"<p vocab="http://schema.org/" typeof="Person"><span property="name">Jane</span></p>"#;
        let items = extractor.parse(&Html::parse_document(html)).unwrap().into_items();
        assert!(items[0].is_of_type([Iri::new("http://schema.org/", "Person")]));
        assert_eq!(items[0].property("name").unwrap()[0].as_str(), Some("Jane"));
    }
}
