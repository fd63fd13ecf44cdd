//! Microdata (schema.org HTML attributes) extraction
//!
//! Extracts items from itemscope/itemprop/itemtype/itemref attributes.
//! Reference: https://html.spec.whatwg.org/multipage/microdata.html

use crate::error::Result;
use crate::extractors::{attr_tokens, language_of, resolve_url, selector, text_content, FormatParser};
use crate::factory::{ParsingResult, RawItem, RawValue};
use crate::format::Format;
use crate::jsonld::is_absolute;
use crate::logger::SharedLogger;
use crate::model::Iri;
use scraper::{ElementRef, Html};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Position of a node in the document: child indices from the root
type NodePath = Vec<usize>;

/// Items resolved so far. `None` marks an item whose properties are still
/// being collected, i.e. one that is reached again through an itemref cycle.
type Registry = HashMap<NodePath, Option<RawItem>>;

pub struct MicrodataExtractor {
    base: Url,
    logger: SharedLogger,
}

impl MicrodataExtractor {
    pub fn new(base: Url, logger: SharedLogger) -> Self {
        Self { base, logger }
    }

    fn to_item<'a>(
        &self,
        element: ElementRef<'a>,
        ids: &HashMap<&'a str, ElementRef<'a>>,
        visited: &mut Registry,
    ) -> Result<RawItem> {
        let path = node_path(&element);
        visited.insert(path.clone(), None);

        let types: Vec<Iri> = attr_tokens(&element, "itemtype")
            .into_iter()
            .map(Iri::from_url)
            .collect();
        let vocabulary = types
            .first()
            .filter(|t| t.is_profiled())
            .map(|t| t.profile().to_string());

        let mut item = RawItem {
            types,
            id: element
                .value()
                .attr("itemid")
                .map(|id| resolve_url(&self.base, id)),
            language: language_of(&element),
            ..Default::default()
        };

        for node in property_nodes(element, ids) {
            let value = if node.value().attr("itemscope").is_some() {
                match visited.get(&node_path(&node)) {
                    Some(Some(resolved)) => RawValue::Item(resolved.clone()),
                    Some(None) => {
                        self.logger.debug(
                            "itemref cycle, using itemid",
                            &[("itemprop", node.value().attr("itemprop").unwrap_or(""))],
                        )?;
                        match node.value().attr("itemid") {
                            Some(id) => RawValue::text(resolve_url(&self.base, id)),
                            None => continue,
                        }
                    }
                    None => RawValue::Item(self.to_item(node, ids, visited)?),
                }
            } else {
                self.scalar_value(&node)
            };

            for name in attr_tokens(&node, "itemprop") {
                item.push_property(property_iri(name, vocabulary.as_deref()), value.clone());
            }
        }

        visited.insert(path, Some(item.clone()));
        Ok(item)
    }

    /// Property value of an element without itemscope
    fn scalar_value(&self, element: &ElementRef) -> RawValue {
        let el = element.value();
        let url_attr = |name: &str| RawValue::text(el.attr(name).map(|v| resolve_url(&self.base, v)).unwrap_or_default());
        let text = |value: String| RawValue::Text {
            text: value.trim().to_string(),
            language: language_of(element),
        };

        match el.name() {
            "meta" => text(el.attr("content").unwrap_or("").to_string()),
            "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => url_attr("src"),
            "a" | "area" | "link" => url_attr("href"),
            "object" => url_attr("data"),
            "data" | "meter" => RawValue::text(el.attr("value").unwrap_or("").trim()),
            "time" => match el.attr("datetime") {
                Some(datetime) => RawValue::text(datetime.trim()),
                None => text(text_content(element)),
            },
            _ => text(text_content(element)),
        }
    }
}

impl FormatParser for MicrodataExtractor {
    fn format(&self) -> Format {
        Format::Microdata
    }

    fn parse(&mut self, document: &Html) -> Result<ParsingResult> {
        let mut ids = HashMap::new();
        for element in document.select(&selector("[id]")?) {
            if let Some(id) = element.value().attr("id") {
                ids.entry(id).or_insert(element);
            }
        }

        // Top-level items are scopes that are not themselves a property
        let mut visited = Registry::new();
        let mut items = Vec::new();
        for element in document.select(&selector("[itemscope]")?) {
            if element.value().attr("itemprop").is_none() {
                items.push(self.to_item(element, &ids, &mut visited)?);
            }
        }

        self.logger.debug("microdata items", &[("count", items.len().to_string().as_str())])?;
        ParsingResult::new(Format::Microdata, items, Vec::new(), &*self.logger)
    }
}

fn node_path(element: &ElementRef) -> NodePath {
    let mut path = Vec::new();
    let mut node = Some(**element);
    while let Some(current) = node {
        path.push(current.prev_siblings().count());
        node = current.parent();
    }
    path.reverse();
    path
}

fn property_iri(name: &str, vocabulary: Option<&str>) -> Iri {
    match vocabulary {
        _ if is_absolute(name) => Iri::from_url(name),
        Some(vocabulary) => Iri::new(vocabulary, name),
        None => Iri::unprofiled(name),
    }
}

/// Elements contributing properties to the scope of `root`, in tree order.
///
/// Traversal starts at the root and at every element its itemref names. An
/// itemprop element is collected and not descended into; a nested itemscope
/// is never descended into. Each element is collected at most once, even if
/// it is both contained in the root and referenced.
fn property_nodes<'a>(root: ElementRef<'a>, ids: &HashMap<&'a str, ElementRef<'a>>) -> Vec<ElementRef<'a>> {
    let root_path = node_path(&root);
    let mut seen: HashSet<NodePath> = HashSet::from([root_path]);

    let mut pending: Vec<(NodePath, ElementRef<'a>)> = Vec::new();
    for id in attr_tokens(&root, "itemref") {
        if let Some(target) = ids.get(id) {
            let path = node_path(target);
            if !seen.contains(&path) && !pending.iter().any(|(p, _)| *p == path) {
                pending.push((path, *target));
            }
        }
    }

    let mut results = Vec::new();
    for child in root.children().filter_map(ElementRef::wrap) {
        visit(child, &mut seen, &mut pending, &mut results);
    }
    while !pending.is_empty() {
        let (_, target) = pending.remove(0);
        visit(target, &mut seen, &mut pending, &mut results);
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results.into_iter().map(|(_, el)| el).collect()
}

fn visit<'a>(
    node: ElementRef<'a>,
    seen: &mut HashSet<NodePath>,
    pending: &mut Vec<(NodePath, ElementRef<'a>)>,
    results: &mut Vec<(NodePath, ElementRef<'a>)>,
) {
    let path = node_path(&node);
    if !seen.insert(path.clone()) {
        return;
    }
    pending.retain(|(p, _)| *p != path);

    if !attr_tokens(&node, "itemprop").is_empty() {
        results.push((path, node));
        return;
    }
    if node.value().attr("itemscope").is_some() {
        return;
    }
    for child in node.children().filter_map(ElementRef::wrap) {
        visit(child, seen, pending, results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::TracingLogger;
    use crate::model::{Item, Value};
    use std::sync::Arc;

    fn extract(html: &str) -> Vec<Item> {
        let base = Url::parse("https://example.com/page/").unwrap();
        let mut extractor = MicrodataExtractor::new(base, Arc::new(TracingLogger));
        extractor
            .parse(&Html::parse_document(html))
            .unwrap()
            .into_items()
    }

    fn texts(values: &[Value]) -> Vec<String> {
        values.iter().map(Value::to_string).collect()
    }

    #[test]
    fn test_extract_simple_microdata() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Product">
            <span itemprop="name">Test Product</span>
            <meta itemprop="gtin13" content="1234567890123">
            <span itemprop="price">19.99</span>
        </div>
        "#;

        let items = extract(html);
        assert_eq!(items.len(), 1);
        let product = &items[0];
        assert_eq!(product.format(), Format::Microdata);
        assert!(product.is_of_type([Iri::new("https://schema.org/", "Product")]));
        assert_eq!(texts(product.property("name").unwrap()), vec!["Test Product"]);
        assert_eq!(
            texts(product.property(Iri::new("https://schema.org/", "gtin13")).unwrap()),
            vec!["1234567890123"]
        );
    }

    #[test]
    fn test_nested_microdata() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Product">
            <span itemprop="name">Product</span>
            <div itemprop="offers" itemscope itemtype="https://schema.org/Offer">
                <span itemprop="price">19.99</span>
            </div>
        </div>
        "#;

        let items = extract(html);
        assert_eq!(items.len(), 1);
        let product = &items[0];
        assert!(!product.properties().contains(&"price".into()));
        let offer = product.property("offers").unwrap()[0].as_item().unwrap();
        assert!(offer.is_of_type(["Offer"]));
        assert_eq!(texts(offer.property("price").unwrap()), vec!["19.99"]);
    }

    #[test]
    fn test_itemref_sibling_and_descendant_counted_once() {
        let html = r#"
        <p id="a" itemprop="x">from sibling</p>
        <div itemscope itemtype="https://schema.org/Thing" itemref="a b">
            <section><span id="b" itemprop="y">from descendant</span></section>
        </div>
        "#;

        let items = extract(html);
        assert_eq!(items.len(), 1);
        let thing = &items[0];
        assert_eq!(texts(thing.property("x").unwrap()), vec!["from sibling"]);
        assert_eq!(texts(thing.property("y").unwrap()), vec!["from descendant"]);
        assert_eq!(thing.properties().len(), 2);
    }

    #[test]
    fn test_itemprop_without_scope_is_not_descended() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Thing">
            <div itemprop="description">Outer <span itemprop="inner">inner</span></div>
        </div>
        "#;

        let items = extract(html);
        let thing = &items[0];
        assert_eq!(texts(thing.property("description").unwrap()), vec!["Outer inner"]);
        assert!(!thing.properties().contains(&"inner".into()));
    }

    #[test]
    fn test_tag_value_table() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Event" lang="en">
            <a itemprop="url" href="/event">Link</a>
            <img itemprop="image" src="img.png">
            <time itemprop="startDate" datetime="2024-05-01T10:00">May 1st</time>
            <time itemprop="endDate">May 2nd</time>
            <data itemprop="capacity" value="120">a hundred and twenty</data>
            <object itemprop="embed" data="https://example.com/file.swf"></object>
            <meta itemprop="keywords" content="music">
        </div>
        "#;

        let items = extract(html);
        let event = &items[0];
        assert_eq!(event.language(), Some("en"));
        assert_eq!(texts(event.property("url").unwrap()), vec!["https://example.com/event"]);
        assert_eq!(
            texts(event.property("image").unwrap()),
            vec!["https://example.com/page/img.png"]
        );
        assert_eq!(texts(event.property("startDate").unwrap()), vec!["2024-05-01T10:00"]);
        assert_eq!(texts(event.property("endDate").unwrap()), vec!["May 2nd"]);
        assert_eq!(texts(event.property("capacity").unwrap()), vec!["120"]);
        assert_eq!(
            texts(event.property("embed").unwrap()),
            vec!["https://example.com/file.swf"]
        );
        match &event.property("keywords").unwrap()[0] {
            Value::String(s) => assert_eq!(s.language(), Some("en")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_multiple_property_names_and_values() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Person">
            <span itemprop="name alternateName">Jane</span>
            <span itemprop="knowsLanguage">en</span>
            <span itemprop="knowsLanguage">de</span>
        </div>
        "#;

        let items = extract(html);
        let person = &items[0];
        assert_eq!(texts(person.property("name").unwrap()), vec!["Jane"]);
        assert_eq!(texts(person.property("alternateName").unwrap()), vec!["Jane"]);
        assert_eq!(texts(person.property("knowsLanguage").unwrap()), vec!["en", "de"]);
    }

    #[test]
    fn test_itemref_cycle_falls_back_to_itemid() {
        let html = r#"
        <div itemscope itemtype="https://schema.org/Person" itemid="urn:a">
            <span itemprop="name">A</span>
            <div id="x" itemprop="knows" itemscope itemtype="https://schema.org/Person" itemid="urn:x" itemref="y">
                <span itemprop="name">X</span>
            </div>
        </div>
        <div id="y" itemprop="knows" itemscope itemtype="https://schema.org/Person" itemref="x">
            <span itemprop="name">Y</span>
        </div>
        "#;

        let items = extract(html);
        assert_eq!(items.len(), 1);
        let x = items[0].property("knows").unwrap()[0].as_item().unwrap();
        assert_eq!(x.id(), Some("urn:x"));
        let y = x.property("knows").unwrap()[0].as_item().unwrap();
        assert_eq!(texts(y.property("name").unwrap()), vec!["Y"]);
        assert_eq!(texts(y.property("knows").unwrap()), vec!["urn:x"]);
    }

    #[test]
    fn test_untyped_scope_is_skipped() {
        let html = r#"<div itemscope><span itemprop="name">No type</span></div>"#;
        let base = Url::parse("https://example.com/").unwrap();
        let mut extractor = MicrodataExtractor::new(base, Arc::new(TracingLogger));
        let result = extractor.parse(&Html::parse_document(html)).unwrap();
        assert!(result.items().is_empty());
        assert_eq!(result.diagnostics().len(), 1);
    }
}
