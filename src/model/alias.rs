//! Lookup aliases for property and type names
//!
//! Names like `dt-published` are not valid identifiers, which makes them
//! awkward to use as accessor keys. Each such name also gets a lower camel case
//! alias (`dtPublished`) so both spellings resolve to the same property.

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*$").unwrap()
});

static LEADING_INVALID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^A-Za-z_\x{80}-\x{10FFFF}]+").unwrap());

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\x{80}-\x{10FFFF}]+").unwrap());

/// Derives the aliases a name can be looked up by
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasFactory;

impl AliasFactory {
    /// Return `[name, ...derived]`
    pub fn create_aliases(name: &str) -> Vec<String> {
        let mut aliases = vec![name.to_string()];
        if let Some(alias) = Self::camel_case(name) {
            aliases.push(alias);
        }
        aliases
    }

    /// Whether `name` can be used as a bare identifier
    pub fn is_identifier(name: &str) -> bool {
        IDENTIFIER.is_match(name)
    }

    fn camel_case(name: &str) -> Option<String> {
        if Self::is_identifier(name) {
            return None;
        }

        let stripped = LEADING_INVALID.replace(name, "");
        let mut alias = String::with_capacity(stripped.len());
        for (i, part) in SEPARATOR
            .split(&stripped)
            .filter(|p| !p.is_empty())
            .enumerate()
        {
            if i == 0 {
                alias.push_str(part);
            } else {
                let mut chars = part.chars();
                if let Some(first) = chars.next() {
                    alias.extend(first.to_uppercase());
                    alias.push_str(chars.as_str());
                }
            }
        }

        (!alias.is_empty() && alias != name).then_some(alias)
    }
}
