use super::{backcompat, Alternate, Document, Mf2Item, MicroformatsEngine, PropertyValue, RelUrl};
use crate::extractors::{attr_tokens, language_of, resolve_url, text_content};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

static ROOT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^h-(?:[a-z0-9]+-)?[a-z]+(?:-[a-z]+)*$").unwrap());
static PROPERTY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(p|u|dt|e)-((?:[a-z0-9]+-)?[a-z]+(?:-[a-z]+)*)$").unwrap());

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-(?:\d{2}-\d{2}|\d{3})$").unwrap());
static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d{1,2}(?::\d{2}(?::\d{2})?)?(?:\s*[ap]\.?m\.?)?(?:Z|[+-]\d{2}:?\d{2})?$").unwrap()
});
static TIMEZONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:Z|[+-]\d{2}:?\d{2})$").unwrap());

/// How a property class reads its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Plain,
    Url,
    DateTime,
    Embedded,
}

impl Kind {
    fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "u" => Kind::Url,
            "dt" => Kind::DateTime,
            "e" => Kind::Embedded,
            _ => Kind::Plain,
        }
    }
}

/// Item under construction, with what implied property parsing needs to know
#[derive(Default)]
struct Builder {
    item: Mf2Item,
    backcompat: bool,
    has_plain: bool,
    has_url: bool,
    has_nested: bool,
}

/// The default microformats engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Mf2Engine;

impl MicroformatsEngine for Mf2Engine {
    fn parse(&self, document: &Html, base: &Url) -> Document {
        let walker = Walker { base };
        let mut parsed = Document::default();
        walker.find_roots(document.root_element(), &mut parsed.items);
        walker.collect_rels(document, &mut parsed);
        parsed
    }
}

struct Walker<'b> {
    base: &'b Url,
}

impl Walker<'_> {
    fn find_roots(&self, element: ElementRef, items: &mut Vec<Mf2Item>) {
        let (types, backcompat) = root_types(&element);
        if !types.is_empty() {
            items.push(self.parse_item(element, types, backcompat));
            return;
        }
        for child in element.children().filter_map(ElementRef::wrap) {
            self.find_roots(child, items);
        }
    }

    fn parse_item(&self, element: ElementRef, types: Vec<String>, backcompat: bool) -> Mf2Item {
        let mut builder = Builder {
            item: Mf2Item {
                types,
                id: element.value().attr("id").map(String::from),
                lang: language_of(&element),
                ..Default::default()
            },
            backcompat,
            ..Default::default()
        };

        for child in element.children().filter_map(ElementRef::wrap) {
            self.walk(child, &mut builder);
        }
        if !builder.backcompat {
            self.imply(&element, &mut builder);
        }
        builder.item
    }

    fn walk(&self, element: ElementRef, builder: &mut Builder) {
        let properties = property_classes(&element, builder);
        let (types, backcompat) = root_types(&element);

        if !types.is_empty() {
            builder.has_nested = true;
            let nested = self.parse_item(element, types, backcompat);
            if properties.is_empty() {
                builder.item.children.push(nested);
                return;
            }
            for (kind, name) in properties {
                let mut value = nested.clone();
                value.value = Some(self.nested_value(&element, kind, &nested, &name));
                builder.item.push(&name, PropertyValue::Item(value));
            }
            return;
        }

        for (kind, name) in properties {
            match kind {
                Kind::Plain | Kind::Embedded => builder.has_plain = true,
                Kind::Url => builder.has_url = true,
                Kind::DateTime => {}
            }
            let value = self.property_value(&element, kind);
            builder.item.push(&name, value);
        }

        for child in element.children().filter_map(ElementRef::wrap) {
            self.walk(child, builder);
        }
    }

    /// Value of a nested item that is also a property
    fn nested_value(&self, element: &ElementRef, kind: Kind, nested: &Mf2Item, name: &str) -> String {
        let own = match kind {
            Kind::Plain => nested.first_text("name"),
            Kind::Url => nested.first_text("url"),
            _ => None,
        };
        match own {
            Some(text) => text.to_string(),
            None => match self.property_value(element, kind) {
                PropertyValue::Text(text) => text,
                PropertyValue::Html { value, .. } => value,
                PropertyValue::Item(_) => name.to_string(),
            },
        }
    }

    fn property_value(&self, element: &ElementRef, kind: Kind) -> PropertyValue {
        match kind {
            Kind::Plain => PropertyValue::Text(self.plain_value(element)),
            Kind::Url => PropertyValue::Text(self.url_value(element)),
            Kind::DateTime => PropertyValue::Text(self.datetime_value(element)),
            Kind::Embedded => PropertyValue::Html {
                html: element.inner_html().trim().to_string(),
                value: text_content(element),
            },
        }
    }

    fn plain_value(&self, element: &ElementRef) -> String {
        if let Some(value) = value_class(element, false) {
            return value;
        }
        let el = element.value();
        let attr = match el.name() {
            "abbr" | "link" => el.attr("title"),
            "data" | "input" => el.attr("value"),
            "img" | "area" => el.attr("alt"),
            _ => None,
        };
        attr.map(|v| v.trim().to_string())
            .unwrap_or_else(|| text_content(element))
    }

    fn url_value(&self, element: &ElementRef) -> String {
        let el = element.value();
        let attr = match el.name() {
            "a" | "area" | "link" => el.attr("href"),
            "img" | "audio" | "source" | "iframe" => el.attr("src"),
            "video" => el.attr("src").or_else(|| el.attr("poster")),
            "object" => el.attr("data"),
            _ => None,
        };
        if let Some(url) = attr {
            return resolve_url(self.base, url);
        }
        if let Some(value) = value_class(element, false) {
            return value;
        }
        match el.name() {
            "abbr" => el.attr("title").map(|v| resolve_url(self.base, v)),
            "data" | "input" => el.attr("value").map(|v| resolve_url(self.base, v)),
            _ => None,
        }
        .unwrap_or_else(|| text_content(element))
    }

    fn datetime_value(&self, element: &ElementRef) -> String {
        if let Some(value) = value_class(element, true) {
            return value;
        }
        let el = element.value();
        let attr = match el.name() {
            "time" | "ins" | "del" => el.attr("datetime"),
            "abbr" => el.attr("title"),
            "data" | "input" => el.attr("value"),
            _ => None,
        };
        attr.map(|v| v.trim().to_string())
            .unwrap_or_else(|| text_content(element))
    }

    /// Implied `name`, `photo` and `url` of an mf2 root
    fn imply(&self, element: &ElementRef, builder: &mut Builder) {
        let nested = builder.has_nested;

        if !builder.item.has("name") && !builder.has_plain && !nested {
            let name = implied_name(element);
            builder.item.push("name", PropertyValue::Text(name));
        }
        if !builder.item.has("photo") && !builder.has_url && !nested {
            if let Some(photo) = implied_attr(element, &[("img", "src"), ("object", "data")]) {
                let photo = resolve_url(self.base, photo);
                builder.item.push("photo", PropertyValue::Text(photo));
            }
        }
        if !builder.item.has("url") && !builder.has_url && !nested {
            if let Some(url) = implied_attr(element, &[("a", "href"), ("area", "href")]) {
                let url = resolve_url(self.base, url);
                builder.item.push("url", PropertyValue::Text(url));
            }
        }
    }

    fn collect_rels(&self, document: &Html, parsed: &mut Document) {
        let links = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "a" | "area" | "link"));

        for link in links {
            let el = link.value();
            let (Some(href), Some(_)) = (el.attr("href"), el.attr("rel")) else {
                continue;
            };
            let url = resolve_url(self.base, href);
            let mut rels: Vec<String> = Vec::new();
            for rel in attr_tokens(&link, "rel") {
                let rel = rel.to_ascii_lowercase();
                if !rels.contains(&rel) {
                    rels.push(rel);
                }
            }
            if rels.is_empty() {
                continue;
            }

            let attr = |name: &str| el.attr(name).map(String::from);
            for rel in &rels {
                let targets = parsed.rels.entry(rel.clone()).or_default();
                if !targets.contains(&url) {
                    targets.push(url.clone());
                }
            }

            let entry = parsed.rel_urls.entry(url.clone()).or_insert_with(|| RelUrl {
                text: Some(text_content(&link)).filter(|t| !t.is_empty()),
                media: attr("media"),
                hreflang: attr("hreflang"),
                media_type: attr("type"),
                title: attr("title"),
                ..Default::default()
            });
            for rel in &rels {
                if !entry.rels.contains(rel) {
                    entry.rels.push(rel.clone());
                }
            }

            if rels.iter().any(|r| r == "alternate") {
                let others: Vec<&str> = rels
                    .iter()
                    .map(String::as_str)
                    .filter(|r| *r != "alternate")
                    .collect();
                parsed.alternates.push(Alternate {
                    url,
                    rel: Some(others.join(" ")).filter(|r| !r.is_empty()),
                    media: attr("media"),
                    hreflang: attr("hreflang"),
                    media_type: attr("type"),
                    title: attr("title"),
                });
            }
        }
    }
}

/// Root types of an element and whether they come from mf1 class names
fn root_types(element: &ElementRef) -> (Vec<String>, bool) {
    let classes = attr_tokens(element, "class");
    let mut types: Vec<String> = classes
        .iter()
        .filter(|c| ROOT_CLASS.is_match(c))
        .map(|c| c.to_string())
        .collect();
    let mut backcompat = false;
    if types.is_empty() {
        types = classes
            .iter()
            .filter_map(|c| backcompat::root_type(c))
            .map(String::from)
            .collect();
        backcompat = true;
    }
    types.sort();
    types.dedup();
    let found = !types.is_empty();
    (types, backcompat && found)
}

/// Property classes of an element relative to the item being built
fn property_classes(element: &ElementRef, builder: &Builder) -> Vec<(Kind, String)> {
    let classes = attr_tokens(element, "class");
    let prefixed: Vec<&str> = if builder.backcompat {
        let roots = &builder.item.types;
        classes
            .iter()
            .filter_map(|c| backcompat::property(roots, c))
            .chain(
                attr_tokens(element, "rel")
                    .into_iter()
                    .filter_map(|r| backcompat::rel_property(roots, r)),
            )
            .collect()
    } else {
        classes
    };

    let mut properties: Vec<(Kind, String)> = Vec::new();
    for class in prefixed {
        if let Some(caps) = PROPERTY_CLASS.captures(class) {
            let property = (Kind::from_prefix(&caps[1]), caps[2].to_string());
            if !properties.contains(&property) {
                properties.push(property);
            }
        }
    }
    properties
}

fn is_root(element: &ElementRef) -> bool {
    !root_types(element).0.is_empty()
}

/// Text of the `value` / `value-title` descendants, if there are any
fn value_class(element: &ElementRef, datetime: bool) -> Option<String> {
    let mut parts = Vec::new();
    collect_value_parts(element, datetime, &mut parts);
    if parts.is_empty() {
        return None;
    }
    if datetime {
        return Some(combine_datetime(&parts));
    }
    Some(parts.concat())
}

fn collect_value_parts(element: &ElementRef, datetime: bool, parts: &mut Vec<String>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        if is_root(&child) {
            continue;
        }
        let classes = attr_tokens(&child, "class");
        let el = child.value();
        if classes.contains(&"value-title") {
            parts.push(el.attr("title").unwrap_or("").trim().to_string());
        } else if classes.contains(&"value") {
            let attr = match el.name() {
                "img" | "area" => el.attr("alt"),
                "data" => el.attr("value"),
                "abbr" => el.attr("title"),
                "time" | "ins" | "del" if datetime => el.attr("datetime"),
                _ => None,
            };
            parts.push(attr.map(|v| v.trim().to_string()).unwrap_or_else(|| text_content(&child)));
        } else {
            collect_value_parts(&child, datetime, parts);
        }
    }
}

/// Join separately marked up date, time and timezone parts
fn combine_datetime(parts: &[String]) -> String {
    let date = parts.iter().find(|p| DATE.is_match(p));
    let time = parts.iter().find(|p| !TIMEZONE.is_match(p) && TIME.is_match(p));
    let zone = parts.iter().find(|p| TIMEZONE.is_match(p));

    match (date, time) {
        (Some(date), Some(time)) => format!("{} {}{}", date, time, zone.map(String::as_str).unwrap_or("")),
        (Some(date), None) => date.clone(),
        (None, Some(time)) => format!("{}{}", time, zone.map(String::as_str).unwrap_or("")),
        (None, None) => parts.concat(),
    }
}

/// The only element child, unless it is a microformat itself
fn only_child<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut children = element.children().filter_map(ElementRef::wrap);
    match (children.next(), children.next()) {
        (Some(child), None) if !is_root(&child) => Some(child),
        _ => None,
    }
}

/// The only child with the given tag, unless it is a microformat itself
fn only_of_type<'a>(element: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    let mut matching = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == tag);
    match (matching.next(), matching.next()) {
        (Some(child), None) if !is_root(&child) => Some(child),
        _ => None,
    }
}

fn implied_name(element: &ElementRef) -> String {
    let named = |el: &ElementRef| -> Option<String> {
        let value = el.value();
        match value.name() {
            "img" | "area" => value.attr("alt"),
            "abbr" => value.attr("title"),
            _ => None,
        }
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    };

    named(element)
        .or_else(|| {
            let child = only_child(element)?;
            named(&child).or_else(|| named(&only_child(&child)?))
        })
        .unwrap_or_else(|| text_content(element))
}

/// Attribute of the root itself, its only child of a tag, or that child's only child
fn implied_attr<'a>(element: &ElementRef<'a>, sources: &[(&str, &str)]) -> Option<&'a str> {
    let own = |el: &ElementRef<'a>| -> Option<&'a str> {
        sources
            .iter()
            .filter(|(tag, _)| el.value().name() == *tag)
            .find_map(|(_, attr)| el.value().attr(attr))
    };
    let child_of = |el: &ElementRef<'a>| -> Option<ElementRef<'a>> {
        sources
            .iter()
            .filter_map(|(tag, attr)| only_of_type(el, tag).filter(|c| c.value().attr(attr).is_some()))
            .next()
    };

    own(element)
        .or_else(|| child_of(element).and_then(|c| own(&c)))
        .or_else(|| {
            let child = only_child(element)?;
            child_of(&child).and_then(|c| own(&c))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Document {
        let base = Url::parse("https://example.com/blog/").unwrap();
        Mf2Engine.parse(&Html::parse_document(html), &base)
    }

    fn text(item: &Mf2Item, name: &str) -> String {
        item.first_text(name).unwrap_or_default().to_string()
    }

    #[test]
    fn test_hcard_with_explicit_properties() {
        let doc = parse(
            r#"<div class="h-card" id="me">
                <a class="p-name u-url" href="/jane">Jane Doe</a>
                <img class="u-photo" src="jane.png" alt="">
                <span class="p-note">Writes <b>code</b></span>
            </div>"#,
        );
        assert_eq!(doc.items.len(), 1);
        let card = &doc.items[0];
        assert_eq!(card.types, vec!["h-card"]);
        assert_eq!(card.id.as_deref(), Some("me"));
        assert_eq!(text(card, "name"), "Jane Doe");
        assert_eq!(text(card, "url"), "https://example.com/jane");
        assert_eq!(text(card, "photo"), "https://example.com/blog/jane.png");
        assert_eq!(text(card, "note"), "Writes code");
    }

    #[test]
    fn test_implied_properties() {
        let doc = parse(
            r#"<a class="h-card" href="https://jane.example"><img src="/me.jpg" alt="Jane"></a>
               <img class="h-card" src="/bob.jpg" alt="Bob">
               <span class="h-card">Alice</span>"#,
        );
        assert_eq!(doc.items.len(), 3);
        let jane = &doc.items[0];
        assert_eq!(text(jane, "name"), "Jane");
        assert_eq!(text(jane, "url"), "https://jane.example/");
        assert_eq!(text(jane, "photo"), "https://example.com/me.jpg");

        let bob = &doc.items[1];
        assert_eq!(text(bob, "name"), "Bob");
        assert_eq!(text(bob, "photo"), "https://example.com/bob.jpg");

        assert_eq!(text(&doc.items[2], "name"), "Alice");
        assert!(!doc.items[2].has("url"));
    }

    #[test]
    fn test_nested_property_and_children() {
        let doc = parse(
            r#"<article class="h-entry">
                <h1 class="p-name">Hello</h1>
                <div class="p-author h-card"><a class="u-url" href="/jane">Jane</a></div>
                <div class="e-content"><p>Body</p></div>
                <time class="dt-published" datetime="2024-01-02T03:04:05Z">Jan 2</time>
                <div class="h-cite"><span class="p-name">Quoted</span></div>
            </article>"#,
        );
        let entry = &doc.items[0];
        assert_eq!(text(entry, "published"), "2024-01-02T03:04:05Z");

        match &entry.get("author").unwrap()[0] {
            PropertyValue::Item(author) => {
                assert_eq!(author.types, vec!["h-card"]);
                assert_eq!(author.value.as_deref(), Some("Jane"));
                assert_eq!(text(author, "url"), "https://example.com/jane");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &entry.get("content").unwrap()[0] {
            PropertyValue::Html { html, value } => {
                assert_eq!(html, "<p>Body</p>");
                assert_eq!(value, "Body");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(entry.children.len(), 1);
        assert_eq!(text(&entry.children[0], "name"), "Quoted");
    }

    #[test]
    fn test_value_class_pattern() {
        let doc = parse(
            r#"<div class="h-event">
                <span class="p-name">Launch</span>
                <span class="dt-start"><span class="value">2024-05-01</span> at <span class="value">18:30</span></span>
                <span class="p-category"><span class="value-title" title="music"></span>Concerts</span>
            </div>"#,
        );
        let event = &doc.items[0];
        assert_eq!(text(event, "start"), "2024-05-01 18:30");
        assert_eq!(text(event, "category"), "music");
    }

    #[test]
    fn test_backcompat_roots() {
        let doc = parse(
            r#"<div class="hentry">
                <h2 class="entry-title">Old post</h2>
                <abbr class="published" title="2009-06-01">June 1st</abbr>
                <a rel="tag" href="/tags/rust">rust</a>
                <div class="author vcard"><span class="fn">Jane</span></div>
            </div>"#,
        );
        let entry = &doc.items[0];
        assert_eq!(entry.types, vec!["h-entry"]);
        assert_eq!(text(entry, "name"), "Old post");
        assert_eq!(text(entry, "published"), "2009-06-01");
        assert_eq!(text(entry, "category"), "rust");
        match &entry.get("author").unwrap()[0] {
            PropertyValue::Item(card) => {
                assert_eq!(card.types, vec!["h-card"]);
                assert_eq!(text(card, "name"), "Jane");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rels_and_alternates() {
        let doc = parse(
            r#"<head>
                <link rel="alternate" type="application/rss+xml" href="/feed.xml" title="Feed">
                <link rel="me authn" href="https://github.com/jane">
            </head>
            <body><a rel="me" href="https://github.com/jane">GitHub</a></body>"#,
        );
        assert_eq!(doc.rels["me"], vec!["https://github.com/jane"]);
        assert_eq!(doc.rels["authn"], vec!["https://github.com/jane"]);
        assert_eq!(doc.rel_urls["https://github.com/jane"].rels, vec!["me", "authn"]);

        assert_eq!(doc.alternates.len(), 1);
        let feed = &doc.alternates[0];
        assert_eq!(feed.url, "https://example.com/feed.xml");
        assert_eq!(feed.media_type.as_deref(), Some("application/rss+xml"));
        assert_eq!(feed.title.as_deref(), Some("Feed"));
        assert!(feed.rel.is_none());
    }

    #[test]
    fn test_repeated_rel_tokens() {
        let doc = parse(r#"<link rel="alternate home HOME alternate" type="text/html" href="/">"#);
        assert_eq!(doc.rel_urls["https://example.com/"].rels, vec!["alternate", "home"]);
        assert_eq!(doc.alternates[0].rel.as_deref(), Some("home"));
    }
}
