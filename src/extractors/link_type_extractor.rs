//! Link types
//!
//! Every `<link>`, `<a>` and `<area>` carrying a `rel` attribute becomes an
//! item typed by its rel values, with its other attributes as properties.

use crate::error::Result;
use crate::extractors::{attr_tokens, resolve_url, selector, FormatParser};
use crate::factory::{ParsingResult, RawItem, RawValue};
use crate::format::Format;
use crate::logger::SharedLogger;
use crate::model::{Iri, HTML_PROFILE};
use scraper::Html;
use url::Url;

/// Attributes holding a whitespace separated list
const LIST_ATTRIBUTES: &[&str] = &["sizes", "charset"];
/// Attributes holding a URL
const URL_ATTRIBUTES: &[&str] = &["href"];

pub struct LinkTypeExtractor {
    base: Url,
    logger: SharedLogger,
}

impl LinkTypeExtractor {
    pub fn new(base: Url, logger: SharedLogger) -> Self {
        Self { base, logger }
    }
}

impl FormatParser for LinkTypeExtractor {
    fn format(&self) -> Format {
        Format::LinkType
    }

    fn parse(&mut self, document: &Html) -> Result<ParsingResult> {
        let links = selector("link[rel], a[rel], area[rel]")?;

        let mut items = Vec::new();
        for link in document.select(&links) {
            let mut item = RawItem::default();
            for rel in attr_tokens(&link, "rel") {
                let iri = Iri::new(HTML_PROFILE, rel.to_ascii_lowercase());
                if !item.types.contains(&iri) {
                    item.types.push(iri);
                }
            }

            for (name, value) in link.value().attrs() {
                if name == "rel" {
                    continue;
                }
                let iri = Iri::new(HTML_PROFILE, name);
                if LIST_ATTRIBUTES.contains(&name) {
                    for token in value.split_ascii_whitespace() {
                        item.push_property(iri.clone(), RawValue::text(token));
                    }
                } else if URL_ATTRIBUTES.contains(&name) {
                    item.push_property(iri, RawValue::text(resolve_url(&self.base, value)));
                } else {
                    item.push_property(iri, RawValue::text(value.trim()));
                }
            }
            items.push(item);
        }

        self.logger.debug("link type items", &[("count", items.len().to_string().as_str())])?;
        ParsingResult::new(Format::LinkType, items, Vec::new(), &*self.logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::TracingLogger;
    use crate::model::Value;
    use std::sync::Arc;

    fn html(name: &str) -> Iri {
        Iri::new(HTML_PROFILE, name)
    }

    #[test]
    fn test_link_types() {
        let document = Html::parse_document(
            r#"<head>
                <link rel="icon apple-touch-icon" href="/icon.png" sizes="16x16 32x32" type="image/png">
                <link rel="stylesheet" href="style.css">
                <link href="/no-rel">
            </head>
            <body><a rel="Author" href="https://jane.example/" title=" Jane ">Jane</a></body>"#,
        );
        let base = Url::parse("https://example.com/dir/").unwrap();
        let mut extractor = LinkTypeExtractor::new(base, Arc::new(TracingLogger));
        let items = extractor.parse(&document).unwrap().into_items();
        assert_eq!(items.len(), 3);

        let icon = &items[0];
        assert_eq!(icon.format(), Format::LinkType);
        assert_eq!(icon.types(), &[html("icon"), html("apple-touch-icon")]);
        assert_eq!(
            icon.property(html("href")).unwrap(),
            &[Value::text("https://example.com/icon.png")]
        );
        assert_eq!(
            icon.property("sizes").unwrap(),
            &[Value::text("16x16"), Value::text("32x32")]
        );
        assert_eq!(icon.property("type").unwrap(), &[Value::text("image/png")]);
        assert!(!icon.properties().contains(&"rel".into()));

        assert_eq!(
            items[1].property("href").unwrap(),
            &[Value::text("https://example.com/dir/style.css")]
        );

        let author = &items[2];
        assert!(author.is_of_type(["author"]));
        assert_eq!(author.property("title").unwrap(), &[Value::text("Jane")]);
    }

    #[test]
    fn test_repeated_rel_tokens_give_one_type() {
        let document = Html::parse_document(r#"<link rel="icon shortcut ICON" href="/favicon.ico">"#);
        let base = Url::parse("https://example.com/").unwrap();
        let mut extractor = LinkTypeExtractor::new(base, Arc::new(TracingLogger));
        let items = extractor.parse(&document).unwrap().into_items();
        assert_eq!(items[0].types(), &[html("icon"), html("shortcut")]);
    }
}
