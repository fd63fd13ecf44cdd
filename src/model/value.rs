//! Property values

use crate::error::{Error, Result};
use crate::model::Item;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

static LANGUAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$").unwrap());

/// Usable form of a document language tag.
///
/// Underscores become hyphens (`en_US` is `en-US`); a tag that still is not
/// well formed yields `None`.
pub fn normalize_language(tag: &str) -> Option<String> {
    let tag = tag.trim().replace('_', "-");
    LANGUAGE_TAG.is_match(&tag).then_some(tag)
}

/// A single property value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(StringValue),
    Alternates(AlternateValues),
    Item(Arc<Item>),
}

impl Value {
    /// Plain string without language
    pub fn text(text: impl Into<String>) -> Self {
        Value::String(StringValue::new(text))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Alternates(a) => a.is_empty(),
            Value::Item(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.text()),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Value::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_alternates(&self) -> Option<&AlternateValues> {
        match self {
            Value::Alternates(a) => Some(a),
            _ => None,
        }
    }

    /// Plain JSON representation
    pub fn export(&self) -> JsonValue {
        match self {
            Value::String(s) => s.export(),
            Value::Alternates(a) => a.export(),
            Value::Item(item) => item.export(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s.text()),
            Value::Alternates(a) => match a.get("value").or_else(|| a.iter().next().map(|(_, v)| v)) {
                Some(v) => v.fmt(f),
                None => Ok(()),
            },
            Value::Item(item) => match item.id() {
                Some(id) => f.write_str(id),
                None => f.write_str(item.value().unwrap_or_default()),
            },
        }
    }
}

impl From<StringValue> for Value {
    fn from(s: StringValue) -> Self {
        Value::String(s)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Value::Item(Arc::new(item))
    }
}

/// String value with an optional language tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    text: String,
    language: Option<String>,
}

impl StringValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    /// Language tagged string; an empty tag means no language
    pub fn with_language(text: impl Into<String>, language: Option<&str>) -> Result<Self> {
        let language = match language.map(str::trim) {
            None | Some("") => None,
            Some(tag) if LANGUAGE_TAG.is_match(tag) => Some(tag.to_string()),
            Some(tag) => {
                return Err(Error::InvalidLanguage {
                    language: tag.to_string(),
                })
            }
        };
        Ok(Self {
            text: text.into(),
            language,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn export(&self) -> JsonValue {
        match &self.language {
            Some(lang) => serde_json::json!({ "value": self.text, "lang": lang }),
            None => JsonValue::String(self.text.clone()),
        }
    }
}

/// Ordered set of named alternate representations, e.g. `{html, value}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlternateValues(Vec<(String, Value)>);

impl AlternateValues {
    pub fn new(values: Vec<(String, Value)>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, v)| v.is_empty())
    }

    fn export(&self) -> JsonValue {
        let mut map = Map::new();
        for (key, value) in &self.0 {
            map.insert(key.clone(), value.export());
        }
        JsonValue::Object(map)
    }
}
