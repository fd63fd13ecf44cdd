//! Profiled names
//!
//! An [`Iri`] pairs a vocabulary profile with a local name. It is the key used
//! for both item types and properties regardless of the source format.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Profile of microformats 2 types and properties
pub const MICROFORMATS_PROFILE: &str = "http://microformats.org/profile/";

/// Profile of HTML link types and link attributes
pub const HTML_PROFILE: &str = "http://www.w3.org/1999/xhtml/vocab#";

/// Immutable `(profile, name)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Iri {
    profile: String,
    name: String,
}

impl Iri {
    pub fn new(profile: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            name: name.into(),
        }
    }

    /// Name without a vocabulary
    pub fn unprofiled(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    /// Like [`Iri::new`] but rejects an empty name
    pub fn profiled(profile: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::MissingName);
        }
        Ok(Self::new(profile, name))
    }

    /// Split an absolute IRI after its last `#` or `/`.
    ///
    /// `https://schema.org/Person` becomes `("https://schema.org/", "Person")`.
    /// Strings without a separator are returned unprofiled.
    pub fn from_url(iri: &str) -> Self {
        let split = iri.rfind('#').or_else(|| iri.rfind('/'));
        match split {
            Some(pos) if crate::jsonld::is_absolute(iri) => {
                Self::new(&iri[..=pos], &iri[pos + 1..])
            }
            _ => Self::unprofiled(iri),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_profiled(&self) -> bool {
        !self.profile.is_empty()
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.profile, self.name)
    }
}

impl From<&str> for Iri {
    fn from(name: &str) -> Self {
        Self::unprofiled(name)
    }
}

impl From<String> for Iri {
    fn from(name: String) -> Self {
        Self::unprofiled(name)
    }
}

impl From<&Iri> for Iri {
    fn from(iri: &Iri) -> Self {
        iri.clone()
    }
}
