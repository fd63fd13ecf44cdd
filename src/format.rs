//! Supported micro-information formats and the format selector bitmask

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A micro-information format an item was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Microformats,
    Microdata,
    JsonLd,
    RdfaLite,
    LinkType,
}

impl Format {
    /// All formats in extraction order
    pub const ALL: [Format; 5] = [
        Format::Microformats,
        Format::Microdata,
        Format::JsonLd,
        Format::RdfaLite,
        Format::LinkType,
    ];

    /// Bit of this format in a [`FormatSet`]
    pub const fn bit(self) -> u8 {
        match self {
            Format::Microformats => 1,
            Format::Microdata => 2,
            Format::JsonLd => 4,
            Format::RdfaLite => 8,
            Format::LinkType => 16,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Microformats => "microformats",
            Format::Microdata => "microdata",
            Format::JsonLd => "json-ld",
            Format::RdfaLite => "rdfa-lite",
            Format::LinkType => "link-type",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bitmask selecting the formats to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct FormatSet(u8);

impl FormatSet {
    pub const NONE: FormatSet = FormatSet(0);
    pub const ALL: FormatSet = FormatSet(31);

    /// Build a set from a raw bitmask, ignoring unknown bits
    pub const fn from_bits(bits: u8) -> Self {
        FormatSet(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, format: Format) -> bool {
        self.0 & format.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Selected formats in extraction order
    pub fn iter(self) -> impl Iterator<Item = Format> {
        Format::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl Default for FormatSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<u8> for FormatSet {
    fn from(bits: u8) -> Self {
        FormatSet::from_bits(bits)
    }
}

impl From<FormatSet> for u8 {
    fn from(set: FormatSet) -> Self {
        set.0
    }
}

impl From<Format> for FormatSet {
    fn from(format: Format) -> Self {
        FormatSet(format.bit())
    }
}

impl BitOr for FormatSet {
    type Output = FormatSet;

    fn bitor(self, rhs: FormatSet) -> FormatSet {
        FormatSet(self.0 | rhs.0)
    }
}

impl BitOr<Format> for FormatSet {
    type Output = FormatSet;

    fn bitor(self, rhs: Format) -> FormatSet {
        FormatSet(self.0 | rhs.bit())
    }
}

impl BitOr for Format {
    type Output = FormatSet;

    fn bitor(self, rhs: Format) -> FormatSet {
        FormatSet(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<Format> for FormatSet {
    fn bitor_assign(&mut self, rhs: Format) {
        self.0 |= rhs.bit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_union_of_every_format() {
        let union = Format::ALL
            .iter()
            .fold(FormatSet::NONE, |set, f| set | *f);
        assert_eq!(union, FormatSet::ALL);
        assert_eq!(FormatSet::ALL.bits(), 31);
    }

    #[test]
    fn test_selection() {
        let set = Format::Microdata | Format::JsonLd;
        assert_eq!(set.bits(), 6);
        assert!(set.contains(Format::JsonLd));
        assert!(!set.contains(Format::Microformats));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Format::Microdata, Format::JsonLd]
        );
        assert_eq!(FormatSet::from_bits(0xff), FormatSet::ALL);
    }

    #[test]
    fn test_unknown_bits_are_dropped_when_decoding() {
        let set: FormatSet = serde_json::from_str("34").unwrap();
        assert_eq!(set, FormatSet::from(Format::Microdata));
        let set: FormatSet = serde_json::from_str("32").unwrap();
        assert!(set.is_empty());
        assert_eq!(serde_json::to_string(&FormatSet::ALL).unwrap(), "31");
    }
}
