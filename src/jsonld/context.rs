use crate::cache::{DocumentCache, MemoryCache};
use crate::error::{Error, Result};
use crate::fetch::fetch_text;
use crate::jsonld::VocabularyCache;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

const CONTEXT_ACCEPT: &str = "application/ld+json, application/json;q=0.9";

/// Loads remote `@context` documents
pub trait ContextLoader {
    fn load(&mut self, url: &str) -> Result<JsonValue>;

    /// Called with every inline (object) context the resolver processes
    fn observe_inline(&mut self, _context: &JsonValue) {}
}

/// Fetches contexts over HTTP
#[derive(Clone)]
pub struct HttpContextLoader {
    agent: ureq::Agent,
}

impl HttpContextLoader {
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl ContextLoader for HttpContextLoader {
    fn load(&mut self, url: &str) -> Result<JsonValue> {
        let text = fetch_text(&self.agent, url, CONTEXT_ACCEPT).map_err(|e| Error::ContextLoad {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::ContextLoad {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Serves a fixed set of context documents, for offline use and tests
#[derive(Debug, Clone, Default)]
pub struct StaticContextLoader {
    documents: HashMap<String, JsonValue>,
}

impl StaticContextLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, document: JsonValue) -> Self {
        self.documents.insert(url.into(), document);
        self
    }
}

impl ContextLoader for StaticContextLoader {
    fn load(&mut self, url: &str) -> Result<JsonValue> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Error::ContextLoad {
                url: url.to_string(),
                message: "context is not available".to_string(),
            })
    }
}

/// Answers context loads from the document cache first and registers every
/// context it passes on with the [`VocabularyCache`]
pub struct CachedContextLoader {
    inner: Option<Box<dyn ContextLoader + Send>>,
    documents: Box<dyn DocumentCache>,
    vocabulary: VocabularyCache,
    fetches: usize,
}

impl CachedContextLoader {
    /// `inner` is consulted on cache misses; `None` means cache only
    pub fn new(inner: Option<Box<dyn ContextLoader + Send>>, documents: Box<dyn DocumentCache>) -> Self {
        Self {
            inner,
            documents,
            vocabulary: VocabularyCache::new(),
            fetches: 0,
        }
    }

    pub fn with_loader(inner: impl ContextLoader + Send + 'static) -> Self {
        Self::new(Some(Box::new(inner)), Box::new(MemoryCache::new()))
    }

    pub fn vocabulary(&self) -> &VocabularyCache {
        &self.vocabulary
    }

    /// Number of loads that missed the cache
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Drop cached documents. Registered vocabularies are kept.
    pub fn clear(&mut self) {
        self.documents.clear();
    }
}

impl ContextLoader for CachedContextLoader {
    fn load(&mut self, url: &str) -> Result<JsonValue> {
        if let Some(text) = self.documents.get(url) {
            let document: JsonValue = serde_json::from_str(&text)?;
            self.vocabulary.register(url, &document);
            return Ok(document);
        }

        let inner = self.inner.as_mut().ok_or_else(|| Error::ContextLoad {
            url: url.to_string(),
            message: "remote contexts are disabled".to_string(),
        })?;
        let document = inner.load(url)?;
        self.fetches += 1;
        tracing::debug!(url, "loaded JSON-LD context");

        self.documents.set(url, document.to_string());
        self.vocabulary.register(url, &document);
        Ok(document)
    }

    fn observe_inline(&mut self, context: &JsonValue) {
        self.vocabulary.register_context(context);
    }
}
