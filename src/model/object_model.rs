//! Read side of the item graph

use crate::error::{Error, Result};
use crate::model::{Iri, Item};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

static ACCESSOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^\[\]\s]+)\s*(?:\[\s*([^\]]*?)\s*\])?\s*$").unwrap());

/// Immutable list of items with type filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemList(Vec<Item>);

impl ItemList {
    pub fn new(items: Vec<Item>) -> Self {
        Self(items)
    }

    /// Items having any of `types`, or all items if `types` is empty
    pub fn items<I, T>(&self, types: I) -> Vec<&Item>
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        let types: Vec<Iri> = types.into_iter().map(Into::into).collect();
        if types.is_empty() {
            return self.0.iter().collect();
        }
        self.0
            .iter()
            .filter(|item| item.is_of_type(types.iter()))
            .collect()
    }

    /// First item having any of `types`
    pub fn first_item<I, T>(&self, types: I) -> Result<&Item>
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        let types: Vec<Iri> = types.into_iter().map(Into::into).collect();
        self.items(types.iter()).into_iter().next().ok_or_else(|| Error::NoItemOfType {
            types: join(&types),
        })
    }

    /// The `index`-th item of a type given by name or alias (`hCard`, `h-card`)
    pub fn item_by_type(&self, type_name: impl Into<Iri>, index: usize) -> Result<&Item> {
        let type_name = type_name.into();
        self.items([&type_name])
            .get(index)
            .copied()
            .ok_or_else(|| Error::ItemIndexOutOfBounds {
                types: type_name.to_string(),
                index,
            })
    }

    /// Resolve an accessor expression like `hCard` or `hCard[1]`
    pub fn lookup(&self, expression: &str) -> Result<&Item> {
        let invalid = || Error::InvalidItemIndex {
            index: expression.to_string(),
        };
        let caps = ACCESSOR.captures(expression).ok_or_else(invalid)?;
        let index = match caps.get(2) {
            Some(m) => m.as_str().parse::<usize>().map_err(|_| invalid())?,
            None => 0,
        };
        self.item_by_type(&caps[1], index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn join(types: &[Iri]) -> String {
    types
        .iter()
        .map(Iri::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Target of one `rel` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelValue(String);

impl RelValue {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An alternate representation of the document (`rel="alternate"` links)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateResource {
    pub url: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Items, rel declarations and alternates of one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemObjectModel {
    items: ItemList,
    rels: BTreeMap<String, Vec<RelValue>>,
    alternates: Vec<AlternateResource>,
}

impl ItemObjectModel {
    pub fn new(
        items: Vec<Item>,
        rels: BTreeMap<String, Vec<RelValue>>,
        alternates: Vec<AlternateResource>,
    ) -> Self {
        Self {
            items: ItemList::new(items),
            rels,
            alternates,
        }
    }

    pub fn item_list(&self) -> &ItemList {
        &self.items
    }

    /// See [`ItemList::items`]
    pub fn items<I, T>(&self, types: I) -> Vec<&Item>
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        self.items.items(types)
    }

    /// See [`ItemList::first_item`]
    pub fn first_item<I, T>(&self, types: I) -> Result<&Item>
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        self.items.first_item(types)
    }

    pub fn rels(&self) -> &BTreeMap<String, Vec<RelValue>> {
        &self.rels
    }

    /// The `index`-th target of a rel type
    pub fn rel(&self, rel: &str, index: usize) -> Result<&RelValue> {
        self.rels
            .get(rel)
            .and_then(|values| values.get(index))
            .ok_or_else(|| Error::InvalidRel {
                rel: rel.to_string(),
                index,
            })
    }

    pub fn alternates(&self) -> &[AlternateResource] {
        &self.alternates
    }

    /// First alternate with the given media type
    pub fn alternate(&self, media_type: &str) -> Result<&AlternateResource> {
        self.alternates
            .iter()
            .find(|alt| alt.media_type.as_deref() == Some(media_type))
            .ok_or_else(|| Error::InvalidAlternate {
                media_type: media_type.to_string(),
            })
    }

    /// Plain nested JSON form
    pub fn export(&self) -> JsonValue {
        serde_json::json!({
            "items": self.items.iter().map(Item::export).collect::<Vec<_>>(),
            "rels": self.rels,
            "alternates": self.alternates,
        })
    }
}
