//! Free-text record filters
//!
//! A filter decides whether a record matches a piece of text across a set of
//! fields. Fields are combined with OR: one matching field is enough.

use serde::{Deserialize, Serialize};
use stay_core::Id;
use std::borrow::Cow;

/// How textual fields are compared against the filter text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring containment
    #[default]
    Partial,
    /// Case-insensitive full equality
    Exact,
}

/// A single field value as seen by filters and sorts
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Bool(bool),
    Null,
}

impl<'a> FieldValue<'a> {
    pub fn text(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }

    pub fn owned(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }

    /// `Null` for `None`, otherwise the mapped value
    pub fn optional<T>(value: Option<T>, f: impl FnOnce(T) -> FieldValue<'a>) -> Self {
        value.map(f).unwrap_or(FieldValue::Null)
    }
}

/// A record whose fields can be read by name
///
/// Dotted names (`property.name`) address fields of related records.
pub trait Record {
    /// Stable identifier, used to break sort ties
    fn record_id(&self) -> Id;

    /// Value of the named field, `None` when the record has no such field
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Does `record` match `text` in any of `fields`?
///
/// Non-textual fields match when the text, read as the field's type, equals the
/// stored value; `mode` only affects textual fields.
pub fn matches<R: Record + ?Sized>(record: &R, text: &str, fields: &[&str], mode: MatchMode) -> bool {
    let needle = text.to_lowercase();
    fields.iter().any(|name| match record.field(name) {
        Some(value) => value_matches(&value, text, &needle, mode),
        None => false,
    })
}

fn value_matches(value: &FieldValue<'_>, raw: &str, needle: &str, mode: MatchMode) -> bool {
    match value {
        FieldValue::Text(s) => {
            let haystack = s.to_lowercase();
            match mode {
                MatchMode::Partial => haystack.contains(needle),
                MatchMode::Exact => haystack == needle,
            }
        }
        FieldValue::Number(n) => raw.trim().parse::<f64>().map(|f| f == *n).unwrap_or(false),
        FieldValue::Bool(b) => raw.trim().parse::<bool>().map(|v| v == *b).unwrap_or(false),
        FieldValue::Null => false,
    }
}

/// A text filter bound to the fields it searches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFilter {
    pub text: String,
    pub fields: Vec<&'static str>,
    pub mode: MatchMode,
}

impl TextFilter {
    /// Substring search across several fields
    pub fn partial(text: impl Into<String>, fields: &[&'static str]) -> Self {
        Self {
            text: text.into(),
            fields: fields.to_vec(),
            mode: MatchMode::Partial,
        }
    }

    /// Equality on a single field
    pub fn exact(text: impl Into<String>, field: &'static str) -> Self {
        Self {
            text: text.into(),
            fields: vec![field],
            mode: MatchMode::Exact,
        }
    }

    pub fn accepts<R: Record + ?Sized>(&self, record: &R) -> bool {
        matches(record, &self.text, &self.fields, self.mode)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    pub(crate) struct Listing {
        pub id: Id,
        pub name: String,
        pub location: Option<String>,
        pub price: f64,
        pub available: bool,
        pub created_at: String,
    }

    impl Listing {
        pub fn new(name: &str, location: &str, price: f64) -> Self {
            Self {
                id: Id::new_v4(),
                name: name.to_string(),
                location: Some(location.to_string()),
                price,
                available: true,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            }
        }
    }

    impl Record for Listing {
        fn record_id(&self) -> Id {
            self.id
        }

        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "name" => Some(FieldValue::text(&self.name)),
                "location" => Some(FieldValue::optional(self.location.as_deref(), FieldValue::text)),
                "price" => Some(FieldValue::Number(self.price)),
                "available" => Some(FieldValue::Bool(self.available)),
                "created_at" => Some(FieldValue::text(&self.created_at)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_partial_is_case_insensitive_substring() {
        let listing = Listing::new("Seaside Loft", "Lisbon", 120.0);
        assert!(matches(&listing, "side", &["name"], MatchMode::Partial));
        assert!(matches(&listing, "LOFT", &["name"], MatchMode::Partial));
        assert!(!matches(&listing, "Porto", &["name", "location"], MatchMode::Partial));
    }

    #[test]
    fn test_exact_requires_full_equality() {
        let listing = Listing::new("Seaside Loft", "Lisbon", 120.0);
        assert!(matches(&listing, "lisbon", &["location"], MatchMode::Exact));
        assert!(!matches(&listing, "Lisb", &["location"], MatchMode::Exact));
    }

    #[test]
    fn test_any_field_is_enough() {
        let listing = Listing::new("Seaside Loft", "Lisbon", 120.0);
        assert!(matches(&listing, "lisbon", &["name", "location"], MatchMode::Partial));
    }

    #[test]
    fn test_non_textual_fields_use_typed_equality() {
        let listing = Listing::new("Seaside Loft", "Lisbon", 120.0);
        assert!(matches(&listing, "120", &["price"], MatchMode::Partial));
        assert!(!matches(&listing, "12", &["price"], MatchMode::Partial));
        assert!(matches(&listing, "true", &["available"], MatchMode::Exact));
        assert!(!matches(&listing, "yes", &["available"], MatchMode::Exact));
    }

    #[test]
    fn test_absent_and_null_fields_never_match() {
        let mut listing = Listing::new("Seaside Loft", "Lisbon", 120.0);
        listing.location = None;
        assert!(!matches(&listing, "", &["location"], MatchMode::Partial));
        assert!(!matches(&listing, "loft", &["missing"], MatchMode::Partial));
        assert!(!matches(&listing, "loft", &[], MatchMode::Partial));
    }

    proptest! {
        #[test]
        fn prop_partial_matches_iff_substring(name in "[a-zA-Z ]{0,16}", needle in "[a-zA-Z]{1,4}") {
            let listing = Listing::new(&name, "", 1.0);
            let expected = name.to_lowercase().contains(&needle.to_lowercase());
            prop_assert_eq!(matches(&listing, &needle, &["name"], MatchMode::Partial), expected);
        }

        #[test]
        fn prop_any_substring_of_a_field_matches(name in "[a-zA-Z]{1,16}", start in 0usize..16, len in 1usize..8) {
            let start = start.min(name.len() - 1);
            let end = (start + len).min(name.len());
            let listing = Listing::new(&name, "", 1.0);
            let needle = name[start..end].to_uppercase();
            prop_assert!(matches(&listing, &needle, &["location", "name"], MatchMode::Partial));
        }
    }
}
