use crate::jsonld::{is_absolute, parse_prefix};
use crate::model::Iri;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Prefix and term tables collected from JSON-LD contexts.
///
/// A context like
///
/// ```json
/// {"@context": {"schema": "http://schema.org/", "name": {"@id": "schema:name"}}}
/// ```
///
/// registers the vocabulary `http://schema.org/` under the prefix `schema` and
/// marks `name` as one of its terms, so `http://schema.org/name` expands to the
/// profiled name `("http://schema.org/", "name")`.
#[derive(Debug, Clone, Default)]
pub struct VocabularyCache {
    loaded: HashSet<String>,
    prefixes: BTreeMap<String, String>,
    terms: HashMap<String, HashSet<String>>,
}

impl VocabularyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the term table of a context document loaded from `url`.
    ///
    /// Returns `false` if that URL was registered before.
    pub fn register(&mut self, url: &str, document: &JsonValue) -> bool {
        if !self.loaded.insert(url.to_string()) {
            return false;
        }
        self.register_context(document.get("@context").unwrap_or(document));
        true
    }

    /// Register an inline `@context` value
    pub fn register_context(&mut self, context: &JsonValue) {
        match context {
            JsonValue::Object(table) => self.register_table(table),
            JsonValue::Array(contexts) => {
                for context in contexts {
                    self.register_context(context);
                }
            }
            _ => {}
        }
    }

    fn register_table(&mut self, table: &Map<String, JsonValue>) {
        let mut compact_terms = Vec::new();

        for (key, definition) in table {
            let id = match definition {
                JsonValue::String(s) => s.as_str(),
                JsonValue::Object(obj) => match obj.get("@id").and_then(JsonValue::as_str) {
                    Some(id) => id,
                    None => continue,
                },
                _ => continue,
            };

            if key == "@vocab" {
                if is_absolute(id) {
                    self.terms.entry(id.to_string()).or_default();
                }
                continue;
            }
            if key.starts_with('@') || id.starts_with('@') {
                continue;
            }

            if let Some((prefix, local)) = parse_prefix(id) {
                compact_terms.push((prefix.to_string(), local.to_string()));
            } else if is_absolute(id) && (id.ends_with('/') || id.ends_with('#')) {
                self.prefixes.insert(key.clone(), id.to_string());
                self.terms.entry(id.to_string()).or_default();
            } else if is_absolute(id) {
                let iri = Iri::from_url(id);
                if iri.is_profiled() && !iri.name().is_empty() {
                    self.terms
                        .entry(iri.profile().to_string())
                        .or_default()
                        .insert(iri.name().to_string());
                }
            }
        }

        for (prefix, local) in compact_terms {
            if let Some(vocabulary) = self.prefixes.get(&prefix) {
                self.terms
                    .entry(vocabulary.clone())
                    .or_default()
                    .insert(local);
            }
        }
    }

    /// Turn a full or compact IRI into a profiled name if its vocabulary and
    /// term are known; otherwise keep the whole string as an unprofiled name.
    pub fn expand_iri(&self, name: &str) -> Iri {
        if let Some((prefix, local)) = parse_prefix(name) {
            if let Some(vocabulary) = self.prefixes.get(prefix) {
                if self.knows(vocabulary, local) {
                    return Iri::new(vocabulary.as_str(), local);
                }
            }
        }

        self.terms
            .iter()
            .filter(|(vocabulary, terms)| {
                name.len() > vocabulary.len()
                    && name.starts_with(vocabulary.as_str())
                    && terms.contains(&name[vocabulary.len()..])
            })
            .max_by_key(|(vocabulary, _)| vocabulary.len())
            .map(|(vocabulary, _)| Iri::new(vocabulary.as_str(), &name[vocabulary.len()..]))
            .unwrap_or_else(|| Iri::unprofiled(name))
    }

    /// Whether `term` was declared for `vocabulary`
    pub fn knows(&self, vocabulary: &str, term: &str) -> bool {
        self.terms
            .get(vocabulary)
            .is_some_and(|terms| terms.contains(term))
    }

    pub fn prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.loaded.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_context() -> JsonValue {
        json!({
            "@context": {
                "type": "@type",
                "@vocab": "http://schema.org/",
                "schema": "http://schema.org/",
                "name": {"@id": "schema:name"},
                "Person": {"@id": "schema:Person"},
                "knows": "schema:knows",
                "xsd": "http://www.w3.org/2001/XMLSchema#"
            }
        })
    }

    #[test]
    fn test_expands_known_terms() {
        let mut cache = VocabularyCache::new();
        assert!(cache.register("https://schema.org", &schema_context()));
        assert!(!cache.register("https://schema.org", &schema_context()));
        assert!(cache.is_loaded("https://schema.org"));

        assert_eq!(cache.prefix("schema"), Some("http://schema.org/"));
        assert_eq!(
            cache.expand_iri("http://schema.org/name"),
            Iri::new("http://schema.org/", "name")
        );
        assert_eq!(
            cache.expand_iri("schema:Person"),
            Iri::new("http://schema.org/", "Person")
        );
    }

    #[test]
    fn test_unknown_names_stay_unprofiled() {
        let mut cache = VocabularyCache::new();
        cache.register("https://schema.org", &schema_context());

        assert_eq!(
            cache.expand_iri("http://schema.org/unregistered"),
            Iri::unprofiled("http://schema.org/unregistered")
        );
        assert_eq!(cache.expand_iri("knows"), Iri::unprofiled("knows"));
        assert_eq!(
            cache.expand_iri("http://example.org/name"),
            Iri::unprofiled("http://example.org/name")
        );
    }

    #[test]
    fn test_full_iri_term_definitions() {
        let mut cache = VocabularyCache::new();
        cache.register_context(&json!({"title": "http://purl.org/dc/terms/title"}));
        assert_eq!(
            cache.expand_iri("http://purl.org/dc/terms/title"),
            Iri::new("http://purl.org/dc/terms/", "title")
        );
    }
}
