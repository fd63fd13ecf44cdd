//! Ordered, alias-aware property container

use crate::error::{Error, Result};
use crate::model::{AliasFactory, Iri, Value};
use std::collections::HashMap;

/// A named list of values as handed to [`PropertyList::add`]
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub iri: Iri,
    pub values: Vec<Value>,
}

impl Property {
    pub fn new(iri: Iri, values: Vec<Value>) -> Self {
        Self { iri, values }
    }
}

/// Alias string to entry position. The first entry registering an alias keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
struct AliasIndex(HashMap<String, usize>);

impl AliasIndex {
    fn register(&mut self, iri: &Iri, position: usize) {
        for alias in AliasFactory::create_aliases(iri.name()) {
            self.0.entry(alias).or_insert(position);
        }
        if iri.is_profiled() {
            self.0.entry(iri.to_string()).or_insert(position);
        }
    }

    /// Positions matching any alias of `name`, in insertion order
    fn resolve(&self, name: &str) -> impl Iterator<Item = usize> {
        let mut positions: Vec<usize> = AliasFactory::create_aliases(name)
            .into_iter()
            .filter_map(|alias| self.0.get(&alias).copied())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter()
    }
}

/// Properties of one item in insertion order.
///
/// Profiled names are looked up exactly. Unprofiled names are matched against
/// every alias of every entry, first entry wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyList {
    entries: Vec<(Iri, Vec<Value>)>,
    index: HashMap<Iri, usize>,
    aliases: AliasIndex,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, appending to an existing entry of the same name
    pub fn add(&mut self, property: Property) {
        let Property { iri, values } = property;

        let existing = self.index.get(&iri).copied().or_else(|| {
            if iri.is_profiled() {
                return None;
            }
            self.aliases
                .resolve(iri.name())
                .find(|&pos| !self.entries[pos].0.is_profiled())
        });

        match existing {
            Some(pos) => self.entries[pos].1.extend(values),
            None => {
                let pos = self.entries.len();
                self.aliases.register(&iri, pos);
                self.index.insert(iri.clone(), pos);
                self.entries.push((iri, values));
            }
        }
    }

    /// Values of a property
    pub fn get(&self, name: &Iri) -> Result<&[Value]> {
        self.position(name)
            .map(|pos| self.entries[pos].1.as_slice())
            .ok_or_else(|| Error::UnknownProperty {
                name: name.to_string(),
            })
    }

    /// Stored name and values of a property
    pub fn entry(&self, name: &Iri) -> Option<(&Iri, &[Value])> {
        self.position(name)
            .map(|pos| (&self.entries[pos].0, self.entries[pos].1.as_slice()))
    }

    pub fn contains(&self, name: &Iri) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Iri, &[Value])> {
        self.entries.iter().map(|(iri, values)| (iri, values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &Iri) -> Option<usize> {
        if name.is_profiled() {
            self.index.get(name).copied()
        } else {
            self.aliases.resolve(name.name()).next()
        }
    }
}

impl<'a> IntoIterator for &'a PropertyList {
    type Item = (&'a Iri, &'a [Value]);
    type IntoIter = Box<dyn Iterator<Item = (&'a Iri, &'a [Value])> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
