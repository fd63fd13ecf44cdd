use super::RdfaEngine;
use crate::extractors::{attr_tokens, resolve_url, text_content};
use crate::factory::{RawItem, RawValue};
use crate::jsonld::{is_absolute, parse_prefix};
use crate::model::{normalize_language, Iri};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use url::Url;

/// Prefixes available without declaration
/// (https://www.w3.org/2011/rdfa-context/rdfa-1.1)
static INITIAL_PREFIXES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("cc", "http://creativecommons.org/ns#"),
        ("dc", "http://purl.org/dc/terms/"),
        ("dcterms", "http://purl.org/dc/terms/"),
        ("foaf", "http://xmlns.com/foaf/0.1/"),
        ("gr", "http://purl.org/goodrelations/v1#"),
        ("og", "http://ogp.me/ns#"),
        ("owl", "http://www.w3.org/2002/07/owl#"),
        ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("schema", "http://schema.org/"),
        ("sioc", "http://rdfs.org/sioc/ns#"),
        ("skos", "http://www.w3.org/2004/02/skos/core#"),
        ("vcard", "http://www.w3.org/2006/vcard/ns#"),
        ("xhv", "http://www.w3.org/1999/xhtml/vocab#"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ]
    .into_iter()
    .collect()
});

/// Vocabulary, prefixes and language in scope of an element
#[derive(Debug, Clone, Default)]
struct EvaluationContext {
    vocab: Option<String>,
    prefixes: HashMap<String, String>,
    language: Option<String>,
}

impl EvaluationContext {
    fn derive(&self, element: &ElementRef) -> Self {
        let el = element.value();
        let mut ctx = self.clone();
        if let Some(vocab) = el.attr("vocab") {
            let vocab = vocab.trim();
            ctx.vocab = (!vocab.is_empty()).then(|| vocab.to_string());
        }
        if let Some(prefix) = el.attr("prefix") {
            let mut tokens = prefix.split_ascii_whitespace();
            while let Some(name) = tokens.next() {
                let (Some(name), Some(iri)) = (name.strip_suffix(':'), tokens.next()) else {
                    break;
                };
                ctx.prefixes.insert(name.to_ascii_lowercase(), iri.to_string());
            }
        }
        if let Some(lang) = el.attr("lang").or_else(|| el.attr("xml:lang")) {
            ctx.language = normalize_language(lang);
        }
        ctx
    }

    /// Expand a term, compact IRI or absolute IRI
    fn expand(&self, name: &str) -> Iri {
        if let Some((prefix, local)) = parse_prefix(name) {
            let vocabulary = self
                .prefixes
                .get(&prefix.to_ascii_lowercase())
                .map(String::as_str)
                .or_else(|| INITIAL_PREFIXES.get(prefix).copied());
            if let Some(vocabulary) = vocabulary {
                return Iri::new(vocabulary, local);
            }
        }
        if is_absolute(name) {
            return Iri::from_url(name);
        }
        match &self.vocab {
            Some(vocab) => Iri::new(vocab.as_str(), name),
            None => Iri::unprofiled(name),
        }
    }
}

/// The default RDFa Lite engine
#[derive(Debug, Clone, Copy, Default)]
pub struct RdfaLiteEngine;

impl RdfaEngine for RdfaLiteEngine {
    fn parse(&self, document: &Html, base: &Url) -> Vec<RawItem> {
        let walker = Walker { base };
        let mut items = Vec::new();
        walker.walk(document.root_element(), &EvaluationContext::default(), None, &mut items);
        items
    }
}

struct Walker<'b> {
    base: &'b Url,
}

impl Walker<'_> {
    fn walk(
        &self,
        element: ElementRef,
        parent: &EvaluationContext,
        mut subject: Option<&mut RawItem>,
        items: &mut Vec<RawItem>,
    ) {
        let ctx = parent.derive(&element);
        let properties: Vec<Iri> = attr_tokens(&element, "property")
            .into_iter()
            .map(|p| ctx.expand(p))
            .collect();

        if element.value().attr("typeof").is_some() {
            let mut item = RawItem {
                types: attr_tokens(&element, "typeof")
                    .into_iter()
                    .map(|t| ctx.expand(t))
                    .collect(),
                id: element
                    .value()
                    .attr("resource")
                    .or_else(|| element.value().attr("about"))
                    .map(|id| resolve_url(self.base, id)),
                language: ctx.language.clone(),
                ..Default::default()
            };
            for child in element.children().filter_map(ElementRef::wrap) {
                self.walk(child, &ctx, Some(&mut item), items);
            }

            match subject {
                Some(subject) if !properties.is_empty() => {
                    for property in properties {
                        subject.push_property(property, RawValue::Item(item.clone()));
                    }
                }
                _ => items.push(item),
            }
            return;
        }

        if let Some(subject) = subject.as_deref_mut() {
            if !properties.is_empty() {
                let value = self.value(&element, &ctx);
                for property in properties {
                    subject.push_property(property, value.clone());
                }
            }
        }

        for child in element.children().filter_map(ElementRef::wrap) {
            self.walk(child, &ctx, subject.as_deref_mut(), items);
        }
    }

    /// Value of a `property` element without `typeof`
    fn value(&self, element: &ElementRef, ctx: &EvaluationContext) -> RawValue {
        let el = element.value();
        let literal = |text: String| RawValue::Text {
            text,
            language: ctx.language.clone(),
        };

        if let Some(content) = el.attr("content") {
            return literal(content.trim().to_string());
        }
        let link = match el.name() {
            _ if el.attr("resource").is_some() => el.attr("resource"),
            "a" | "area" | "link" => el.attr("href"),
            "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => el.attr("src"),
            "object" => el.attr("data"),
            _ => None,
        };
        if let Some(link) = link {
            return RawValue::text(resolve_url(self.base, link));
        }
        if let (Some(datetime), "time") = (el.attr("datetime"), el.name()) {
            return RawValue::text(datetime.trim());
        }
        literal(text_content(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Vec<RawItem> {
        let base = Url::parse("https://example.com/").unwrap();
        RdfaLiteEngine.parse(&Html::parse_document(html), &base)
    }

    fn values<'i>(item: &'i RawItem, name: &Iri) -> &'i [RawValue] {
        &item.properties.iter().find(|p| p.iri == *name).unwrap().values
    }

    fn schema(name: &str) -> Iri {
        Iri::new("http://schema.org/", name)
    }

    #[test]
    fn test_vocab_and_nested_items() {
        let items = parse(
            r##"<div vocab="http://schema.org/" typeof="Person" resource="#jane" lang="en">
                <span property="name">Jane</span>
                <a property="url" href="/jane">home</a>
                <div property="address" typeof="PostalAddress">
                    <span property="addressLocality">Berlin</span>
                </div>
                <time property="birthDate" datetime="1990-01-01">1 Jan</time>
            </div>"##,
        );
        assert_eq!(items.len(), 1);
        let person = &items[0];
        assert_eq!(person.types, vec![schema("Person")]);
        assert_eq!(person.id.as_deref(), Some("https://example.com/#jane"));
        assert_eq!(
            values(person, &schema("name")),
            &[RawValue::Text {
                text: "Jane".to_string(),
                language: Some("en".to_string())
            }]
        );
        assert_eq!(values(person, &schema("url")), &[RawValue::text("https://example.com/jane")]);
        assert_eq!(values(person, &schema("birthDate")), &[RawValue::text("1990-01-01")]);

        match &values(person, &schema("address"))[0] {
            RawValue::Item(address) => {
                assert_eq!(address.types, vec![schema("PostalAddress")]);
                assert_eq!(address.properties.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_prefixes() {
        let items = parse(
            r#"<div prefix="ex: http://example.org/ns#" typeof="foaf:Document">
                <span property="ex:title dc:title">Doc</span>
                <meta property="http://purl.org/dc/terms/creator" content="Jane">
            </div>"#,
        );
        let doc = &items[0];
        assert_eq!(doc.types, vec![Iri::new("http://xmlns.com/foaf/0.1/", "Document")]);
        assert_eq!(doc.properties[0].iri, Iri::new("http://example.org/ns#", "title"));
        assert_eq!(doc.properties[1].iri, Iri::new("http://purl.org/dc/terms/", "title"));
        assert_eq!(doc.properties[2].iri, Iri::new("http://purl.org/dc/terms/", "creator"));
        assert_eq!(doc.properties[2].values[0], RawValue::text("Jane"));
    }

    #[test]
    fn test_unrelated_typeof_is_top_level() {
        let items = parse(
            r#"<section vocab="http://schema.org/" typeof="Blog">
                <article typeof="BlogPosting"><h1 property="headline">Hi</h1></article>
                <span property="name">Blog</span>
            </section>
            <p property="name">no subject</p>"#,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].types, vec![schema("BlogPosting")]);
        assert_eq!(items[1].types, vec![schema("Blog")]);
        assert_eq!(items[1].properties.len(), 1);
    }
}
