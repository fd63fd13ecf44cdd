//! Validated items

use crate::error::{Error, Result};
use crate::format::Format;
use crate::model::{normalize_language, AliasFactory, Iri, Property, PropertyList, Value};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// One extracted unit of structured data.
///
/// Items are validated once by [`ItemBuilder::build`] and never change
/// afterwards. Every item has at least one type.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    format: Format,
    types: Vec<Iri>,
    id: Option<String>,
    language: Option<String>,
    value: Option<String>,
    properties: PropertyList,
    children: Vec<Item>,
}

impl Item {
    pub fn builder(format: Format) -> ItemBuilder {
        ItemBuilder::new(format)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn types(&self) -> &[Iri] {
        &self.types
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    /// Items nested below this one that are not property values
    pub fn children(&self) -> &[Item] {
        &self.children
    }

    /// Whether the item has any of the given types.
    ///
    /// Profiled names must match exactly, bare names match by alias.
    pub fn is_of_type<I, T>(&self, types: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        types.into_iter().any(|t| {
            let query = t.into();
            self.types.iter().any(|own| type_matches(own, &query))
        })
    }

    /// All values of a property
    pub fn property(&self, name: impl Into<Iri>) -> Result<&[Value]> {
        self.properties.get(&name.into())
    }

    /// A single value of a property
    pub fn property_value(&self, name: impl Into<Iri>, index: usize) -> Result<&Value> {
        let name = name.into();
        self.properties
            .get(&name)?
            .get(index)
            .ok_or_else(|| Error::PropertyIndexOutOfBounds {
                name: name.to_string(),
                index,
            })
    }

    /// Values of the first property in `names` the item has
    pub fn first_property<I, T>(&self, names: I) -> Result<&[Value]>
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        let mut tried = Vec::new();
        for name in names {
            let name = name.into();
            if let Ok(values) = self.properties.get(&name) {
                return Ok(values);
            }
            tried.push(name.to_string());
        }
        Err(Error::UnknownProperty {
            name: tried.join(", "),
        })
    }

    /// Plain nested JSON form of the item
    pub fn export(&self) -> JsonValue {
        let types: Vec<JsonValue> = self.types.iter().map(export_iri).collect();
        let properties: Vec<JsonValue> = self
            .properties
            .iter()
            .map(|(iri, values)| {
                let mut entry = export_iri(iri);
                entry["values"] = values.iter().map(Value::export).collect();
                entry
            })
            .collect();
        let items: Vec<JsonValue> = self.children.iter().map(Item::export).collect();

        serde_json::json!({
            "format": self.format.as_str(),
            "id": self.id,
            "language": self.language,
            "value": self.value,
            "types": types,
            "properties": properties,
            "items": items,
        })
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.export().serialize(serializer)
    }
}

fn export_iri(iri: &Iri) -> JsonValue {
    serde_json::json!({ "profile": iri.profile(), "name": iri.name() })
}

fn type_matches(own: &Iri, query: &Iri) -> bool {
    if query.is_profiled() {
        return own == query;
    }
    if own.to_string() == query.name() {
        return true;
    }
    let own_aliases = AliasFactory::create_aliases(own.name());
    AliasFactory::create_aliases(query.name())
        .iter()
        .any(|alias| own_aliases.contains(alias))
}

/// Collects the parts of an [`Item`] and validates them in [`build`](Self::build)
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    format: Format,
    types: Vec<Iri>,
    id: Option<String>,
    language: Option<String>,
    value: Option<String>,
    properties: Vec<Property>,
    children: Vec<Item>,
}

impl ItemBuilder {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            types: Vec::new(),
            id: None,
            language: None,
            value: None,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn types(mut self, types: impl IntoIterator<Item = Iri>) -> Self {
        self.types.extend(types);
        self
    }

    pub fn id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Item>) -> Self {
        self.children.extend(children);
        self
    }

    /// Validate and freeze the item.
    ///
    /// Types with empty names are dropped; an item without any remaining type
    /// is rejected. Empty values are dropped and properties left without values
    /// are not stored.
    pub fn build(self) -> Result<Item> {
        let types: Vec<Iri> = self
            .types
            .into_iter()
            .filter(|iri| !iri.name().trim().is_empty())
            .collect();
        if types.is_empty() {
            return Err(Error::EmptyTypeList);
        }

        let mut properties = PropertyList::new();
        for property in self.properties {
            if property.iri.name().trim().is_empty() {
                return Err(Error::EmptyPropertyName);
            }
            let values: Vec<Value> = property
                .values
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect();
            if values.is_empty() {
                continue;
            }
            properties.add(Property::new(property.iri, values));
        }

        Ok(Item {
            format: self.format,
            types,
            id: non_empty(self.id),
            language: self.language.as_deref().and_then(normalize_language),
            value: non_empty(self.value),
            properties,
            children: self.children,
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MICROFORMATS_PROFILE;

    fn h_card() -> Item {
        Item::builder(Format::Microformats)
            .types([Iri::new(MICROFORMATS_PROFILE, "h-card")])
            .property(Property::new(
                Iri::new(MICROFORMATS_PROFILE, "name"),
                vec![Value::text("John Doe")],
            ))
            .property(Property::new(
                Iri::new(MICROFORMATS_PROFILE, "dt-bday"),
                vec![Value::text("1970-01-01")],
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_h_card_lookup() {
        let item = h_card();
        let names = item.property("name").unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].as_str(), Some("John Doe"));
        assert!(item.is_of_type(["h-card"]));
        assert!(item.is_of_type(["hCard"]));
        assert!(item.is_of_type([Iri::new(MICROFORMATS_PROFILE, "h-card")]));
        assert!(!item.is_of_type([Iri::new("https://schema.org/", "h-card")]));
        assert!(!item.is_of_type(["h-entry"]));
    }

    #[test]
    fn test_empty_type_list() {
        let err = Item::builder(Format::Microdata)
            .types([Iri::new("https://schema.org/", ""), Iri::unprofiled("  ")])
            .build()
            .unwrap_err();
        assert_eq!(err, Error::EmptyTypeList);
    }

    #[test]
    fn test_empty_property_name() {
        let err = Item::builder(Format::Microdata)
            .types([Iri::unprofiled("Thing")])
            .property(Property::new(Iri::unprofiled(" "), vec![Value::text("x")]))
            .build()
            .unwrap_err();
        assert_eq!(err, Error::EmptyPropertyName);
    }

    #[test]
    fn test_empty_values_are_dropped() {
        let item = Item::builder(Format::Microdata)
            .types([Iri::unprofiled("Thing")])
            .property(Property::new(Iri::unprofiled("blank"), vec![Value::text("  ")]))
            .property(Property::new(
                Iri::unprofiled("mixed"),
                vec![Value::text(""), Value::text("kept")],
            ))
            .build()
            .unwrap();
        assert!(!item.properties().contains(&"blank".into()));
        assert_eq!(item.property("mixed").unwrap().len(), 1);
    }

    #[test]
    fn test_property_index_and_first_property() {
        let item = h_card();
        assert_eq!(
            item.property_value("dtBday", 0).unwrap().as_str(),
            Some("1970-01-01")
        );
        assert_eq!(
            item.property_value("name", 3),
            Err(Error::PropertyIndexOutOfBounds {
                name: "name".to_string(),
                index: 3
            })
        );
        let first = item.first_property(["nickname", "name"]).unwrap();
        assert_eq!(first[0].as_str(), Some("John Doe"));
        assert_eq!(
            item.first_property(["nickname", "photo"]),
            Err(Error::UnknownProperty {
                name: "nickname, photo".to_string()
            })
        );
        assert!(matches!(
            item.property("missing"),
            Err(Error::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_export_layout() {
        let exported = h_card().export();
        assert_eq!(exported["format"], "microformats");
        assert_eq!(exported["types"][0]["name"], "h-card");
        assert_eq!(exported["properties"][0]["name"], "name");
        assert_eq!(exported["properties"][0]["values"][0], "John Doe");
        assert!(exported["id"].is_null());
        assert_eq!(exported["items"], serde_json::json!([]));
    }
}
