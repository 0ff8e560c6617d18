//! List query parameters and the paginated envelope
//!
//! Every list endpoint accepts a [`ListQuery`] and answers with a
//! [`PaginatedResult`]. Query parsing is lenient: values that are missing or
//! not numbers fall back to the defaults instead of rejecting the request.

use serde::{Deserialize, Deserializer, Serialize};

/// Offset applied when the request carries none
pub const DEFAULT_OFFSET: i64 = 0;

/// Page size applied when the request carries none
pub const DEFAULT_LIMIT: i64 = 10;

/// Sort direction
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn reverse(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// List parameters (from query string)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    /// Free-text search
    #[serde(default)]
    pub q: Option<String>,

    /// Requested sort field; checked against the resource's allow-list
    #[serde(default)]
    pub sort_by: Option<String>,

    #[serde(default, deserialize_with = "lenient_direction")]
    pub order: Option<SortDirection>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub offset: Option<i64>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Build from decoded query-string pairs.
    ///
    /// The first occurrence of a key wins. Unknown keys are ignored and each
    /// value that does not parse falls back on its own, leaving the others intact.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        let (mut offset, mut limit, mut order) = (None, None, None);

        for (key, value) in pairs {
            match key.as_ref() {
                "q" if query.q.is_none() => query.q = Some(value.into()),
                "sort_by" if query.sort_by.is_none() => query.sort_by = Some(value.into()),
                "order" if order.is_none() => order = Some(value.into()),
                "offset" if offset.is_none() => offset = Some(value.into()),
                "limit" if limit.is_none() => limit = Some(value.into()),
                _ => {}
            }
        }

        query.order = order.as_deref().and_then(SortDirection::parse);
        query.offset = offset.and_then(|raw| LenientNumber::Text(raw).into_i64());
        query.limit = limit.and_then(|raw| LenientNumber::Text(raw).into_i64());
        query
    }

    /// Offset to apply: the requested one when non-negative, otherwise 0
    pub fn effective_offset(&self) -> i64 {
        match self.offset {
            Some(offset) if offset >= 0 => offset,
            _ => DEFAULT_OFFSET,
        }
    }

    /// Page size to apply: the requested one when positive, otherwise 10,
    /// never above `max_limit`
    pub fn effective_limit(&self, max_limit: i64) -> i64 {
        let limit = match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_LIMIT,
        };
        limit.min(max_limit.max(1))
    }

    /// Trimmed search text, `None` when absent or blank
    pub fn search_text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn direction(&self) -> SortDirection {
        self.order.unwrap_or_default()
    }
}

/// Paginated collection envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    /// Total number of matching records; `None` when it could not be determined
    pub count: Option<i64>,
    pub offset: i64,
    pub limit: i64,
}

impl<T> PaginatedResult<T> {
    pub fn new(data: Vec<T>, count: i64, offset: i64, limit: i64) -> Self {
        Self {
            data,
            count: Some(count),
            offset,
            limit,
        }
    }

    /// Empty envelope returned when the listing itself failed
    pub fn degraded(offset: i64, limit: i64) -> Self {
        Self {
            data: vec![],
            count: None,
            offset,
            limit,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            count: self.count,
            offset: self.offset,
            limit: self.limit,
        }
    }

    pub fn has_next(&self) -> bool {
        match self.count {
            Some(count) => self.offset + (self.data.len() as i64) < count,
            None => false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl LenientNumber {
    fn into_i64(self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(n),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0 && f.is_finite())
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(LenientNumber::into_i64))
}

fn lenient_direction<'de, D>(deserializer: D) -> Result<Option<SortDirection>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(SortDirection::parse))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(json: serde_json::Value) -> ListQuery {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_defaults_when_absent() {
        let q = query(serde_json::json!({}));
        assert_eq!(q.effective_offset(), 0);
        assert_eq!(q.effective_limit(1000), 10);
        assert_eq!(q.direction(), SortDirection::Asc);
        assert!(q.search_text().is_none());
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let q = query(serde_json::json!({ "offset": "20", "limit": "5" }));
        assert_eq!(q.effective_offset(), 20);
        assert_eq!(q.effective_limit(1000), 5);
    }

    #[test]
    fn test_non_numeric_values_fall_back() {
        let q = query(serde_json::json!({ "offset": "abc", "limit": "ten" }));
        assert_eq!(q.offset, None);
        assert_eq!(q.limit, None);
        assert_eq!(q.effective_offset(), 0);
        assert_eq!(q.effective_limit(1000), 10);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let q = query(serde_json::json!({ "offset": -4, "limit": 0 }));
        assert_eq!(q.effective_offset(), 0);
        assert_eq!(q.effective_limit(1000), 10);
    }

    #[test]
    fn test_limit_is_capped() {
        let q = query(serde_json::json!({ "limit": 5000 }));
        assert_eq!(q.effective_limit(1000), 1000);
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!(query(serde_json::json!({ "order": "DESC" })).direction(), SortDirection::Desc);
        assert_eq!(query(serde_json::json!({ "order": "sideways" })).direction(), SortDirection::Asc);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        assert!(query(serde_json::json!({ "q": "   " })).search_text().is_none());
        assert_eq!(query(serde_json::json!({ "q": " Paris " })).search_text(), Some("Paris"));
    }

    #[test]
    fn test_pairs_fall_back_per_field() {
        let q = ListQuery::from_pairs([
            ("q", "flat"),
            ("limit", "1"),
            ("limit", "2"),
            ("offset", "abc"),
            ("order", "desc"),
            ("sort_by", "name"),
            ("location", "Lisbon"),
        ]);

        assert_eq!(q.search_text(), Some("flat"));
        assert_eq!(q.limit, Some(1));
        assert_eq!(q.offset, None);
        assert_eq!(q.effective_offset(), 0);
        assert_eq!(q.direction(), SortDirection::Desc);
        assert_eq!(q.sort_by.as_deref(), Some("name"));
    }

    #[test]
    fn test_envelope_serialization() {
        let page = PaginatedResult::new(vec![1, 2], 7, 0, 2);
        assert!(page.has_next());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({ "data": [1, 2], "count": 7, "offset": 0, "limit": 2 }));

        let degraded: PaginatedResult<i32> = PaginatedResult::degraded(30, 10);
        let json = serde_json::to_value(&degraded).unwrap();
        assert_eq!(json, serde_json::json!({ "data": [], "count": null, "offset": 30, "limit": 10 }));
    }
}
