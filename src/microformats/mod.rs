//! Microformats 1 and 2 parsing
//!
//! [`Mf2Engine`] walks a parsed HTML document and produces the parse tree of
//! the microformats2 parsing rules: root items with their properties, nested
//! children, and the document's `rel` links. Microformats 1 roots (`vcard`,
//! `hentry`, ...) are parsed with their mf2 equivalents.
//!
//! Reference: https://microformats.org/wiki/microformats2-parsing

mod backcompat;
mod engine;

pub use engine::Mf2Engine;

use scraper::Html;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Produces the microformats parse tree of a document
pub trait MicroformatsEngine {
    fn parse(&self, document: &Html, base: &Url) -> Document;
}

/// Parse tree of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub items: Vec<Mf2Item>,
    pub rels: BTreeMap<String, Vec<String>>,
    #[serde(rename = "rel-urls")]
    pub rel_urls: BTreeMap<String, RelUrl>,
    pub alternates: Vec<Alternate>,
}

/// A microformat root and everything parsed below it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mf2Item {
    pub types: Vec<String>,
    pub id: Option<String>,
    pub lang: Option<String>,
    /// Set on items that are also a property value of their parent
    pub value: Option<String>,
    /// Property names without prefix (`name`, not `p-name`), in document order
    pub properties: Vec<(String, Vec<PropertyValue>)>,
    pub children: Vec<Mf2Item>,
}

impl Mf2Item {
    pub fn push(&mut self, name: &str, value: PropertyValue) {
        match self.properties.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value),
            None => self.properties.push((name.to_string(), vec![value])),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.properties.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&[PropertyValue]> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// First plain text value of a property
    pub fn first_text(&self, name: &str) -> Option<&str> {
        self.get(name)?.iter().find_map(|value| match value {
            PropertyValue::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Serialize for Mf2Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.types)?;
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(lang) = &self.lang {
            map.serialize_entry("lang", lang)?;
        }
        if let Some(value) = &self.value {
            map.serialize_entry("value", value)?;
        }
        map.serialize_entry("properties", &Properties(&self.properties))?;
        if !self.children.is_empty() {
            map.serialize_entry("children", &self.children)?;
        }
        map.end()
    }
}

struct Properties<'a>(&'a [(String, Vec<PropertyValue>)]);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, values) in self.0 {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    /// `e-*` properties keep the markup next to its text
    Html { html: String, value: String },
    Item(Mf2Item),
}

/// Attributes of a link target, merged over all links pointing to it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelUrl {
    pub rels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A `rel="alternate"` link
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Alternate {
    pub url: String,
    /// The link's other rel values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_json_layout() {
        let mut item = Mf2Item {
            types: vec!["h-card".to_string()],
            ..Default::default()
        };
        item.push("name", PropertyValue::Text("Jane".to_string()));
        item.push(
            "note",
            PropertyValue::Html {
                html: "<b>Hi</b>".to_string(),
                value: "Hi".to_string(),
            },
        );
        item.push("name", PropertyValue::Text("JJ".to_string()));

        assert_eq!(item.first_text("name"), Some("Jane"));
        assert!(!item.has("url"));
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({
                "type": ["h-card"],
                "properties": {
                    "name": ["Jane", "JJ"],
                    "note": [{"html": "<b>Hi</b>", "value": "Hi"}]
                }
            })
        );
    }
}
