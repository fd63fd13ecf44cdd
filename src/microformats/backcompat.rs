//! Microformats 1 class names mapped to their mf2 equivalents

/// mf1 root class to mf2 root type
const ROOTS: &[(&str, &str)] = &[
    ("adr", "h-adr"),
    ("geo", "h-geo"),
    ("hentry", "h-entry"),
    ("hfeed", "h-feed"),
    ("hproduct", "h-product"),
    ("hreview", "h-review"),
    ("vcard", "h-card"),
];

const ADR: &[(&str, &str)] = &[
    ("country-name", "p-country-name"),
    ("extended-address", "p-extended-address"),
    ("locality", "p-locality"),
    ("post-office-box", "p-post-office-box"),
    ("postal-code", "p-postal-code"),
    ("region", "p-region"),
    ("street-address", "p-street-address"),
];

const GEO: &[(&str, &str)] = &[("latitude", "p-latitude"), ("longitude", "p-longitude")];

const CARD: &[(&str, &str)] = &[
    ("additional-name", "p-additional-name"),
    ("adr", "p-adr"),
    ("bday", "dt-bday"),
    ("category", "p-category"),
    ("email", "u-email"),
    ("family-name", "p-family-name"),
    ("fn", "p-name"),
    ("geo", "p-geo"),
    ("given-name", "p-given-name"),
    ("honorific-prefix", "p-honorific-prefix"),
    ("honorific-suffix", "p-honorific-suffix"),
    ("key", "u-key"),
    ("label", "p-label"),
    ("logo", "u-logo"),
    ("nickname", "p-nickname"),
    ("note", "p-note"),
    ("org", "p-org"),
    ("organization-name", "p-organization-name"),
    ("organization-unit", "p-organization-unit"),
    ("photo", "u-photo"),
    ("role", "p-role"),
    ("sound", "u-sound"),
    ("tel", "p-tel"),
    ("title", "p-job-title"),
    ("tz", "p-tz"),
    ("uid", "u-uid"),
    ("url", "u-url"),
];

const ENTRY: &[(&str, &str)] = &[
    ("author", "p-author"),
    ("category", "p-category"),
    ("entry-content", "e-content"),
    ("entry-summary", "p-summary"),
    ("entry-title", "p-name"),
    ("geo", "p-geo"),
    ("published", "dt-published"),
    ("updated", "dt-updated"),
];

const FEED: &[(&str, &str)] = &[
    ("author", "p-author"),
    ("category", "p-category"),
    ("photo", "u-photo"),
    ("url", "u-url"),
];

const PRODUCT: &[(&str, &str)] = &[
    ("brand", "p-brand"),
    ("category", "p-category"),
    ("description", "e-content"),
    ("fn", "p-name"),
    ("identifier", "u-identifier"),
    ("photo", "u-photo"),
    ("price", "p-price"),
    ("review", "p-review"),
    ("url", "u-url"),
];

const REVIEW: &[(&str, &str)] = &[
    ("best", "p-best"),
    ("description", "e-content"),
    ("dtreviewed", "dt-published"),
    ("item", "p-item"),
    ("rating", "p-rating"),
    ("reviewer", "p-author"),
    ("summary", "p-name"),
    ("worst", "p-worst"),
];

/// `rel` values that act as properties
const ENTRY_RELS: &[(&str, &str)] = &[("bookmark", "u-url"), ("tag", "p-category")];

fn properties_of(root: &str) -> &'static [(&'static str, &'static str)] {
    match root {
        "h-adr" => ADR,
        "h-card" => CARD,
        "h-entry" => ENTRY,
        "h-feed" => FEED,
        "h-geo" => GEO,
        "h-product" => PRODUCT,
        "h-review" => REVIEW,
        _ => &[],
    }
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .binary_search_by(|(k, _)| (*k).cmp(key))
        .ok()
        .map(|i| table[i].1)
}

/// mf2 root type of a microformats 1 root class
pub fn root_type(class: &str) -> Option<&'static str> {
    lookup(ROOTS, class)
}

/// Prefixed mf2 property class (`p-name`) of an mf1 property class inside
/// roots of the given mf2 types
pub fn property(roots: &[String], class: &str) -> Option<&'static str> {
    roots
        .iter()
        .find_map(|root| lookup(properties_of(root), class))
}

/// Prefixed mf2 property class of a `rel` value inside roots of the given types
pub fn rel_property(roots: &[String], rel: &str) -> Option<&'static str> {
    roots
        .iter()
        .filter(|root| matches!(root.as_str(), "h-entry" | "h-review"))
        .find_map(|_| lookup(ENTRY_RELS, rel))
}
