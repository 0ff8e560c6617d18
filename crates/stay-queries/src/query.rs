//! List configuration and resolved list plans
//!
//! A [`ListConfig`] is the fixed, per-resource description of what a list
//! endpoint allows. Combining it with a client's [`ListQuery`] yields a
//! [`ListPlan`]: the sanitized sort, window, and filters a store executes.

use crate::filters::{Record, TextFilter};
use stay_core::{ListQuery, SortDirection};

/// Page size cap applied when a resource does not set one
pub const DEFAULT_MAX_LIMIT: i64 = 1000;

/// Per-resource list configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    /// Fields a client may sort by
    pub sortable: &'static [&'static str],
    /// Sort field used when the requested one is absent or not allowed
    pub default_sort: &'static str,
    /// Fields searched by `q`; empty disables search
    pub search_fields: &'static [&'static str],
    pub max_limit: i64,
}

impl ListConfig {
    pub const fn new(sortable: &'static [&'static str], default_sort: &'static str) -> Self {
        Self {
            sortable,
            default_sort,
            search_fields: &[],
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    pub const fn searching(self, fields: &'static [&'static str]) -> Self {
        Self {
            search_fields: fields,
            ..self
        }
    }

    pub const fn with_max_limit(self, max_limit: i64) -> Self {
        Self { max_limit, ..self }
    }

    /// The allow-listed field matching `requested`, else the default
    pub fn sort_field(&self, requested: Option<&str>) -> &'static str {
        requested
            .and_then(|name| self.sortable.iter().find(|field| **field == name).copied())
            .unwrap_or(self.default_sort)
    }
}

/// Resolved list request, ready for a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlan {
    pub sort_field: &'static str,
    pub direction: SortDirection,
    pub offset: i64,
    pub limit: i64,
    /// All filters must accept a record for it to be listed
    pub filters: Vec<TextFilter>,
}

impl ListPlan {
    pub fn resolve(query: &ListQuery, config: &ListConfig) -> Self {
        let mut filters = Vec::new();
        if let Some(text) = query.search_text() {
            if !config.search_fields.is_empty() {
                filters.push(TextFilter::partial(text, config.search_fields));
            }
        }

        Self {
            sort_field: config.sort_field(query.sort_by.as_deref()),
            direction: query.direction(),
            offset: query.effective_offset(),
            limit: query.effective_limit(config.max_limit),
            filters,
        }
    }

    /// Add a filter that must hold in addition to the search
    pub fn with_filter(mut self, filter: TextFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn accepts<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.filters.iter().all(|filter| filter.accepts(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::MatchMode;

    const CONFIG: ListConfig = ListConfig::new(&["name", "price_per_night", "created_at"], "name")
        .searching(&["name", "description", "location"]);

    fn query(json: serde_json::Value) -> ListQuery {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_unknown_sort_field_falls_back() {
        let plan = ListPlan::resolve(&query(serde_json::json!({ "sort_by": "nonexistent_field" })), &CONFIG);
        assert_eq!(plan.sort_field, "name");
        assert_eq!(plan.direction, SortDirection::Asc);
    }

    #[test]
    fn test_allowed_sort_field_is_used() {
        let plan = ListPlan::resolve(
            &query(serde_json::json!({ "sort_by": "created_at", "order": "desc" })),
            &CONFIG,
        );
        assert_eq!(plan.sort_field, "created_at");
        assert_eq!(plan.direction, SortDirection::Desc);
    }

    #[test]
    fn test_search_builds_partial_filter() {
        let plan = ListPlan::resolve(&query(serde_json::json!({ "q": "beach" })), &CONFIG);
        assert_eq!(plan.filters.len(), 1);
        assert_eq!(plan.filters[0].mode, MatchMode::Partial);
        assert_eq!(plan.filters[0].fields, vec!["name", "description", "location"]);

        let plan = ListPlan::resolve(&query(serde_json::json!({ "q": "" })), &CONFIG);
        assert!(plan.filters.is_empty());
    }

    #[test]
    fn test_limit_respects_config_cap() {
        let config = CONFIG.with_max_limit(50);
        let plan = ListPlan::resolve(&query(serde_json::json!({ "limit": 500, "offset": "7" })), &config);
        assert_eq!(plan.limit, 50);
        assert_eq!(plan.offset, 7);
    }
}
