//! Record ordering
//!
//! Compares records on a single field. Text that reads as a timestamp on both
//! sides is ordered chronologically; other text uses case-insensitive collation.
//! Numbers compare numerically. Anything else (mixed types, nulls, absent fields)
//! is considered equal.

use crate::filters::{FieldValue, Record};
use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::Collator;
use stay_core::{parse_timestamp, SortDirection};
use std::cmp::Ordering;

fn collator_options() -> CollatorOptions {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Secondary); // Case-insensitive, accent-aware
    options
}

/// Compare two records on `field` in the given direction.
pub fn compare<R: Record + ?Sized>(a: &R, b: &R, field: &str, direction: SortDirection) -> Ordering {
    match Collator::try_new(Default::default(), collator_options()) {
        Ok(collator) => compare_with(a, b, field, direction, &|x, y| collator.compare(x, y)),
        Err(_) => compare_with(a, b, field, direction, &fallback_text_order),
    }
}

/// Sort records in place on `field`, breaking ties by record id.
pub fn sort_records<R: Record>(records: &mut [R], field: &str, direction: SortDirection) {
    match Collator::try_new(Default::default(), collator_options()) {
        Ok(collator) => {
            let text = |x: &str, y: &str| collator.compare(x, y);
            records.sort_by(|a, b| {
                compare_with(a, b, field, direction, &text)
                    .then_with(|| a.record_id().cmp(&b.record_id()))
            });
        }
        Err(_) => {
            records.sort_by(|a, b| {
                compare_with(a, b, field, direction, &fallback_text_order)
                    .then_with(|| a.record_id().cmp(&b.record_id()))
            });
        }
    }
}

fn fallback_text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_with<R, F>(a: &R, b: &R, field: &str, direction: SortDirection, text: &F) -> Ordering
where
    R: Record + ?Sized,
    F: Fn(&str, &str) -> Ordering,
{
    let ordering = match (a.field(field), b.field(field)) {
        (Some(left), Some(right)) => compare_values(&left, &right, text),
        _ => Ordering::Equal,
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn compare_values<F>(left: &FieldValue<'_>, right: &FieldValue<'_>, text: &F) -> Ordering
where
    F: Fn(&str, &str) -> Ordering,
{
    match (left, right) {
        (FieldValue::Text(l), FieldValue::Text(r)) => match (parse_timestamp(l), parse_timestamp(r)) {
            (Some(lt), Some(rt)) => lt.cmp(&rt),
            _ => text(l, r),
        },
        (FieldValue::Number(l), FieldValue::Number(r)) => l.partial_cmp(r).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::tests::Listing;
    use proptest::prelude::*;

    #[test]
    fn test_text_is_case_insensitive() {
        let a = Listing::new("apple", "", 1.0);
        let b = Listing::new("Banana", "", 1.0);
        assert_eq!(compare(&a, &b, "name", SortDirection::Asc), Ordering::Less);
        assert_eq!(compare(&a, &b, "name", SortDirection::Desc), Ordering::Greater);

        let upper = Listing::new("LOFT", "", 1.0);
        let lower = Listing::new("loft", "", 1.0);
        assert_eq!(compare(&upper, &lower, "name", SortDirection::Asc), Ordering::Equal);
    }

    #[test]
    fn test_timestamps_compare_chronologically() {
        let mut a = Listing::new("a", "", 1.0);
        let mut b = Listing::new("b", "", 1.0);
        // 2024-01-09T20:00:00Z once the offset is applied
        a.created_at = "2024-01-10T01:00:00+05:00".to_string();
        b.created_at = "2024-01-09T23:00:00Z".to_string();
        assert_eq!(compare(&a, &b, "created_at", SortDirection::Asc), Ordering::Less);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        let cheap = Listing::new("a", "", 9.5);
        let pricey = Listing::new("b", "", 120.0);
        assert_eq!(compare(&cheap, &pricey, "price", SortDirection::Asc), Ordering::Less);
    }

    #[test]
    fn test_mismatched_and_missing_are_equal() {
        let mut a = Listing::new("a", "Lisbon", 1.0);
        let b = Listing::new("b", "Porto", 1.0);
        a.location = None;
        assert_eq!(compare(&a, &b, "location", SortDirection::Asc), Ordering::Equal);
        assert_eq!(compare(&a, &b, "unknown", SortDirection::Desc), Ordering::Equal);
        assert_eq!(compare(&a, &b, "available", SortDirection::Asc), Ordering::Equal);
    }

    #[test]
    fn test_sort_records_breaks_ties_by_id() {
        let mut listings = vec![
            Listing::new("same", "", 1.0),
            Listing::new("same", "", 1.0),
            Listing::new("same", "", 1.0),
        ];
        let mut ids: Vec<_> = listings.iter().map(|l| l.id).collect();
        ids.sort();

        sort_records(&mut listings, "name", SortDirection::Desc);
        let sorted: Vec<_> = listings.iter().map(|l| l.id).collect();
        assert_eq!(sorted, ids);
    }

    proptest! {
        #[test]
        fn prop_desc_reverses_asc(a in "[a-z]{1,8}", b in "[a-z]{1,8}", pa in 0.0f64..1000.0, pb in 0.0f64..1000.0) {
            let left = Listing::new(&a, "", pa);
            let right = Listing::new(&b, "", pb);
            for field in ["name", "price"] {
                prop_assert_eq!(
                    compare(&left, &right, field, SortDirection::Asc),
                    compare(&left, &right, field, SortDirection::Desc).reverse()
                );
            }
        }
    }
}
