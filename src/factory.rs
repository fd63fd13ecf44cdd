//! From format-specific parse trees to validated items
//!
//! Adapters produce [`RawItem`]s, an unvalidated intermediate shape shared by
//! all formats. [`ItemFactory`] turns them into [`Item`]s. Anything that has to
//! be skipped on the way is recorded as a [`Diagnostic`] instead of failing the
//! whole document.

use crate::error::{Error, Result};
use crate::format::Format;
use crate::logger::Logger;
use crate::model::{AlternateValues, Iri, Item, Property, StringValue, Value};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Unvalidated item as produced by a format adapter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub types: Vec<Iri>,
    pub id: Option<String>,
    pub language: Option<String>,
    pub value: Option<String>,
    pub properties: Vec<RawProperty>,
    pub children: Vec<RawItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawProperty {
    pub iri: Iri,
    pub values: Vec<RawValue>,
}

impl RawProperty {
    pub fn new(iri: Iri, values: Vec<RawValue>) -> Self {
        Self { iri, values }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text {
        text: String,
        language: Option<String>,
    },
    Alternates(Vec<(String, RawValue)>),
    Item(RawItem),
}

impl RawValue {
    pub fn text(text: impl Into<String>) -> Self {
        RawValue::Text {
            text: text.into(),
            language: None,
        }
    }
}

impl RawItem {
    /// Append values to a property, keeping the first-seen property order
    pub fn push_property(&mut self, iri: Iri, value: RawValue) {
        match self.properties.iter_mut().find(|p| p.iri == iri) {
            Some(property) => property.values.push(value),
            None => self.properties.push(RawProperty::new(iri, vec![value])),
        }
    }

    /// Decode the layout written by [`Item::export`].
    ///
    /// Also accepts the mf2 JSON spelling (`type`, `lang`, `children` and
    /// properties as a name to values map). Properties whose values are not a
    /// list or contain `null` are skipped and reported in `diagnostics`.
    pub fn from_json(json: &JsonValue, diagnostics: &mut Vec<Diagnostic>) -> Result<RawItem> {
        let obj = json.as_object().ok_or_else(|| Error::Json {
            message: "item must be a JSON object".to_string(),
        })?;

        let mut types = Vec::new();
        if let Some(list) = obj.get("types").or_else(|| obj.get("type")) {
            for t in list.as_array().map(Vec::as_slice).unwrap_or(std::slice::from_ref(list)) {
                types.push(decode_iri(t)?);
            }
        }

        let mut properties = Vec::new();
        match obj.get("properties") {
            Some(JsonValue::Array(entries)) => {
                for entry in entries {
                    let iri = decode_iri(entry)?;
                    push_decoded(&mut properties, iri, entry.get("values"), diagnostics);
                }
            }
            Some(JsonValue::Object(map)) => {
                for (name, values) in map {
                    push_decoded(
                        &mut properties,
                        Iri::unprofiled(name.as_str()),
                        Some(values),
                        diagnostics,
                    );
                }
            }
            _ => {}
        }

        let mut children = Vec::new();
        if let Some(JsonValue::Array(items)) = obj.get("items").or_else(|| obj.get("children")) {
            for child in items {
                children.push(RawItem::from_json(child, diagnostics)?);
            }
        }

        Ok(RawItem {
            types,
            id: string_member(obj, &["id"]),
            language: string_member(obj, &["language", "lang"]),
            value: string_member(obj, &["value"]),
            properties,
            children,
        })
    }
}

fn string_member(obj: &Map<String, JsonValue>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(JsonValue::as_str))
        .map(String::from)
}

fn decode_iri(json: &JsonValue) -> Result<Iri> {
    match json {
        JsonValue::String(s) => Ok(Iri::unprofiled(s.as_str())),
        JsonValue::Object(obj) => {
            let name = obj.get("name").and_then(JsonValue::as_str).ok_or(Error::MissingName)?;
            let profile = obj.get("profile").and_then(JsonValue::as_str).unwrap_or("");
            Iri::profiled(profile, name)
        }
        _ => Err(Error::MissingName),
    }
}

fn push_decoded(
    properties: &mut Vec<RawProperty>,
    iri: Iri,
    values: Option<&JsonValue>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(JsonValue::Array(values)) = values else {
        diagnostics.push(Diagnostic::new(iri.to_string(), "property values are not a list"));
        return;
    };
    match values
        .iter()
        .map(|v| decode_value(&iri, v, diagnostics))
        .collect::<Result<Vec<_>>>()
    {
        Ok(values) => properties.push(RawProperty::new(iri, values)),
        Err(e) => diagnostics.push(Diagnostic::new(iri.to_string(), e.to_string())),
    }
}

fn decode_value(iri: &Iri, json: &JsonValue, diagnostics: &mut Vec<Diagnostic>) -> Result<RawValue> {
    match json {
        JsonValue::String(s) => Ok(RawValue::text(s.as_str())),
        JsonValue::Number(n) => Ok(RawValue::text(n.to_string())),
        JsonValue::Bool(b) => Ok(RawValue::text(b.to_string())),
        JsonValue::Null => Err(Error::InvalidPropertyValue {
            name: iri.to_string(),
            reason: "null".to_string(),
        }),
        JsonValue::Array(_) => Err(Error::InvalidPropertyValue {
            name: iri.to_string(),
            reason: "nested list".to_string(),
        }),
        JsonValue::Object(obj) => {
            if obj.contains_key("types") || obj.contains_key("type") {
                return Ok(RawValue::Item(RawItem::from_json(json, diagnostics)?));
            }
            if let (2, Some(text), Some(lang)) = (
                obj.len(),
                obj.get("value").and_then(JsonValue::as_str),
                obj.get("lang").and_then(JsonValue::as_str),
            ) {
                return Ok(RawValue::Text {
                    text: text.to_string(),
                    language: Some(lang.to_string()),
                });
            }
            obj.iter()
                .map(|(k, v)| Ok((k.clone(), decode_value(iri, v, diagnostics)?)))
                .collect::<Result<Vec<_>>>()
                .map(RawValue::Alternates)
        }
    }
}

/// Something an adapter or the factory skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What was skipped: a property name, a script index, ...
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Builds validated items of one format
#[derive(Debug, Clone, Copy)]
pub struct ItemFactory {
    format: Format,
}

impl ItemFactory {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    /// Validate a raw item and everything nested in it.
    ///
    /// Children and properties that fail are dropped and reported; the item
    /// itself fails only if its own type list or property names are invalid.
    pub fn create(&self, raw: RawItem, diagnostics: &mut Vec<Diagnostic>) -> Result<Item> {
        let mut children = Vec::with_capacity(raw.children.len());
        for child in raw.children {
            match self.create(child, diagnostics) {
                Ok(item) => children.push(item),
                Err(e) => diagnostics.push(Diagnostic::new("child item", e.to_string())),
            }
        }

        let mut properties = Vec::with_capacity(raw.properties.len());
        for property in raw.properties {
            let subject = property.iri.to_string();
            match self.create_values(property.values, diagnostics) {
                Ok(values) => properties.push(Property::new(property.iri, values)),
                Err(e) => diagnostics.push(Diagnostic::new(subject, e.to_string())),
            }
        }

        Item::builder(self.format)
            .types(raw.types)
            .id(raw.id)
            .language(raw.language)
            .value(raw.value)
            .properties(properties)
            .children(children)
            .build()
    }

    fn create_values(
        &self,
        values: Vec<RawValue>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<Value>> {
        values
            .into_iter()
            .map(|value| self.create_value(value, diagnostics))
            .collect()
    }

    fn create_value(&self, value: RawValue, diagnostics: &mut Vec<Diagnostic>) -> Result<Value> {
        match value {
            RawValue::Text { text, language } => {
                Ok(Value::String(StringValue::with_language(text, language.as_deref())?))
            }
            RawValue::Alternates(members) => {
                let members = members
                    .into_iter()
                    .map(|(key, v)| Ok((key, self.create_value(v, diagnostics)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Alternates(AlternateValues::new(members)))
            }
            RawValue::Item(raw) => Ok(Value::from(self.create(raw, diagnostics)?)),
        }
    }
}

/// Items one adapter extracted, tagged with their format
#[derive(Debug, Clone, PartialEq)]
pub struct ParsingResult {
    format: Format,
    items: Vec<Item>,
    diagnostics: Vec<Diagnostic>,
}

impl ParsingResult {
    /// Run every raw item through the factory.
    ///
    /// `diagnostics` carries what the adapter already skipped. Every diagnostic
    /// is reported to the logger as a warning.
    pub fn new(
        format: Format,
        raw_items: Vec<RawItem>,
        mut diagnostics: Vec<Diagnostic>,
        logger: &dyn Logger,
    ) -> Result<Self> {
        let factory = ItemFactory::new(format);
        let mut items = Vec::with_capacity(raw_items.len());
        for (i, raw) in raw_items.into_iter().enumerate() {
            match factory.create(raw, &mut diagnostics) {
                Ok(item) => items.push(item),
                Err(e) => diagnostics.push(Diagnostic::new(format!("item #{}", i), e.to_string())),
            }
        }

        for diagnostic in &diagnostics {
            logger.warn(
                &diagnostic.message,
                &[("format", format.as_str()), ("subject", diagnostic.subject.as_str())],
            )?;
        }

        Ok(Self {
            format,
            items,
            diagnostics,
        })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{StrictLogger, TracingLogger};
    use crate::model::MICROFORMATS_PROFILE;

    fn mf(name: &str) -> Iri {
        Iri::new(MICROFORMATS_PROFILE, name)
    }

    fn card() -> RawItem {
        let mut raw = RawItem {
            types: vec![mf("h-card")],
            id: Some("#me".to_string()),
            language: Some("en".to_string()),
            value: Some("Jane".to_string()),
            ..Default::default()
        };
        raw.push_property(mf("name"), RawValue::text("Jane"));
        raw.push_property(
            mf("note"),
            RawValue::Alternates(vec![
                ("html".to_string(), RawValue::text("<p>Hi</p>")),
                ("value".to_string(), RawValue::text("Hi")),
            ]),
        );
        raw.push_property(
            mf("org"),
            RawValue::Item(RawItem {
                types: vec![mf("h-card")],
                properties: vec![RawProperty::new(mf("name"), vec![RawValue::text("ACME")])],
                ..Default::default()
            }),
        );
        raw
    }

    #[test]
    fn test_value_classification() {
        let mut diagnostics = Vec::new();
        let item = ItemFactory::new(Format::Microformats)
            .create(card(), &mut diagnostics)
            .unwrap();
        assert!(diagnostics.is_empty());
        assert!(matches!(item.property("name").unwrap()[0], Value::String(_)));
        assert!(matches!(item.property("note").unwrap()[0], Value::Alternates(_)));
        let org = item.property("org").unwrap()[0].as_item().unwrap();
        assert_eq!(org.format(), Format::Microformats);
        assert_eq!(org.property("name").unwrap()[0].as_str(), Some("ACME"));
    }

    #[test]
    fn test_bad_property_is_dropped_not_the_item() {
        let mut raw = card();
        raw.push_property(
            mf("nickname"),
            RawValue::Text {
                text: "JJ".to_string(),
                language: Some("not a language".to_string()),
            },
        );
        raw.push_property(mf("org"), RawValue::Item(RawItem::default()));

        let mut diagnostics = Vec::new();
        let item = ItemFactory::new(Format::Microformats)
            .create(raw, &mut diagnostics)
            .unwrap();
        assert!(!item.properties().contains(&"nickname".into()));
        assert!(!item.properties().contains(&"org".into()));
        assert_eq!(item.property("name").unwrap().len(), 1);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_export_round_trip() {
        let mut diagnostics = Vec::new();
        let factory = ItemFactory::new(Format::Microformats);
        let item = factory.create(card(), &mut diagnostics).unwrap();

        let raw = RawItem::from_json(&item.export(), &mut diagnostics).unwrap();
        let again = factory.create(raw, &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty());

        assert_eq!(again.types(), item.types());
        assert_eq!(again.id(), item.id());
        assert_eq!(again.language(), item.language());
        assert_eq!(again.value(), item.value());
        let names = |i: &Item| i.properties().iter().map(|(iri, _)| iri.clone()).collect::<Vec<_>>();
        assert_eq!(names(&again), names(&item));
    }

    #[test]
    fn test_from_json_skips_malformed_properties() {
        let json = serde_json::json!({
            "type": ["h-entry"],
            "properties": {
                "name": ["Hello"],
                "summary": "not a list",
                "category": ["a", null],
                "rating": [5]
            }
        });
        let mut diagnostics = Vec::new();
        let raw = RawItem::from_json(&json, &mut diagnostics).unwrap();
        let names: Vec<_> = raw.properties.iter().map(|p| p.iri.name().to_string()).collect();
        assert_eq!(names, vec!["name", "rating"]);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(raw.properties[1].values, vec![RawValue::text("5")]);
    }

    #[test]
    fn test_missing_type_name() {
        let json = serde_json::json!({"types": [{"profile": MICROFORMATS_PROFILE}]});
        assert_eq!(
            RawItem::from_json(&json, &mut Vec::new()),
            Err(Error::MissingName)
        );
    }

    #[test]
    fn test_parsing_result_skips_invalid_items() {
        let result = ParsingResult::new(
            Format::Microformats,
            vec![RawItem::default(), card()],
            Vec::new(),
            &TracingLogger,
        )
        .unwrap();
        assert_eq!(result.format(), Format::Microformats);
        assert_eq!(result.items().len(), 1);
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.diagnostics()[0].subject, "item #0");

        let strict = ParsingResult::new(
            Format::Microformats,
            vec![RawItem::default()],
            Vec::new(),
            &StrictLogger::<TracingLogger>::default(),
        );
        assert!(matches!(strict, Err(Error::Logged { .. })));
    }
}
