//! Paginated listing
//!
//! [`paginate`] turns a client query into a [`PaginatedResult`] by resolving a
//! [`ListPlan`] and asking a [`PageSource`] for the matching window. Stores
//! implement `PageSource` by translating the plan into their own query language;
//! plain vectors implement it with [`apply_plan`].

use crate::filters::Record;
use crate::query::{ListConfig, ListPlan};
use crate::sorts::sort_records;
use async_trait::async_trait;
use stay_core::{ListQuery, PaginatedResult};

/// One window of matching records plus the total number of matches
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self { items: vec![], total: 0 }
    }
}

/// Anything that can execute a list plan
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    type Error: Send;

    async fn fetch_page(&self, plan: &ListPlan) -> Result<Page<T>, Self::Error>;
}

/// List records for a client query under a resource configuration.
pub async fn paginate<T, S>(
    source: &S,
    query: &ListQuery,
    config: &ListConfig,
) -> Result<PaginatedResult<T>, S::Error>
where
    S: PageSource<T> + ?Sized,
{
    paginate_plan(source, ListPlan::resolve(query, config)).await
}

/// List records for an already resolved plan.
pub async fn paginate_plan<T, S>(source: &S, plan: ListPlan) -> Result<PaginatedResult<T>, S::Error>
where
    S: PageSource<T> + ?Sized,
{
    let page = source.fetch_page(&plan).await?;
    Ok(PaginatedResult::new(page.items, page.total, plan.offset, plan.limit))
}

/// Execute a plan over records held in memory.
pub fn apply_plan<T, I>(records: I, plan: &ListPlan) -> Page<T>
where
    T: Record,
    I: IntoIterator<Item = T>,
{
    let mut matched: Vec<T> = records.into_iter().filter(|r| plan.accepts(r)).collect();
    let total = matched.len() as i64;
    sort_records(&mut matched, plan.sort_field, plan.direction);

    let items = matched
        .into_iter()
        .skip(plan.offset.max(0) as usize)
        .take(plan.limit.max(0) as usize)
        .collect();

    Page { items, total }
}

#[async_trait]
impl<T> PageSource<T> for Vec<T>
where
    T: Record + Clone + Send + Sync,
{
    type Error = std::convert::Infallible;

    async fn fetch_page(&self, plan: &ListPlan) -> Result<Page<T>, Self::Error> {
        Ok(apply_plan(self.iter().cloned(), plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::tests::Listing;
    use crate::filters::TextFilter;
    use proptest::prelude::*;

    const CONFIG: ListConfig =
        ListConfig::new(&["name", "price", "created_at"], "name").searching(&["name", "location"]);

    fn query(json: serde_json::Value) -> ListQuery {
        serde_json::from_value(json).unwrap()
    }

    fn dated(name: &str, created_at: &str) -> Listing {
        let mut listing = Listing::new(name, "Lisbon", 10.0);
        listing.created_at = created_at.to_string();
        listing
    }

    #[tokio::test]
    async fn test_sorts_by_created_at_and_counts_all() {
        let records = vec![
            dated("jan", "2024-01-15T00:00:00Z"),
            dated("mar", "2024-03-15T00:00:00Z"),
            dated("feb", "2024-02-15T00:00:00Z"),
        ];

        let result = paginate(
            &records,
            &query(serde_json::json!({ "sort_by": "created_at", "offset": 0, "limit": 2 })),
            &CONFIG,
        )
        .await
        .unwrap();

        let names: Vec<_> = result.data.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["jan", "feb"]);
        assert_eq!(result.count, Some(3));
        assert_eq!((result.offset, result.limit), (0, 2));
    }

    #[tokio::test]
    async fn test_unknown_sort_uses_default_field() {
        let records = vec![
            Listing::new("Cabin", "", 1.0),
            Listing::new("attic", "", 1.0),
            Listing::new("Bungalow", "", 1.0),
        ];

        let result = paginate(&records, &query(serde_json::json!({ "sort_by": "nonexistent_field" })), &CONFIG)
            .await
            .unwrap();

        let names: Vec<_> = result.data.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["attic", "Bungalow", "Cabin"]);
    }

    #[tokio::test]
    async fn test_offset_past_end_keeps_count() {
        let records = vec![Listing::new("a", "", 1.0), Listing::new("b", "", 1.0)];
        let result = paginate(&records, &query(serde_json::json!({ "offset": 5 })), &CONFIG)
            .await
            .unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.count, Some(2));
        assert_eq!(result.offset, 5);
    }

    #[tokio::test]
    async fn test_search_and_extra_filter_combine() {
        let records = vec![
            Listing::new("Beach house", "Lisbon", 1.0),
            Listing::new("Beach hut", "Porto", 1.0),
            Listing::new("City flat", "Lisbon", 1.0),
        ];

        let plan = ListPlan::resolve(&query(serde_json::json!({ "q": "beach" })), &CONFIG)
            .with_filter(TextFilter::exact("lisbon", "location"));
        let result = paginate_plan(&records, plan).await.unwrap();

        assert_eq!(result.count, Some(1));
        assert_eq!(result.data[0].name, "Beach house");
    }

    fn listings() -> impl Strategy<Value = Vec<Listing>> {
        prop::collection::vec(("[a-z]{1,6}", 0.0f64..500.0), 0..40).prop_map(|rows| {
            rows.into_iter()
                .map(|(name, price)| Listing::new(&name, "Lisbon", price))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_window_size_and_count(records in listings(), offset in 0i64..50, limit in 1i64..20, q in proptest::option::of("[a-z]{1,2}")) {
            let mut query = ListQuery { offset: Some(offset), limit: Some(limit), ..Default::default() };
            query.q = q.clone();
            let plan = ListPlan::resolve(&query, &CONFIG);

            let matched = records
                .iter()
                .filter(|r| q.as_ref().map(|q| r.name.contains(q.as_str()) || "lisbon".contains(q.as_str())).unwrap_or(true))
                .count() as i64;
            let page = apply_plan(records.clone(), &plan);

            prop_assert_eq!(page.total, matched);
            prop_assert_eq!(page.items.len() as i64, limit.min((matched - offset).max(0)));
        }

        #[test]
        fn prop_listing_is_idempotent(records in listings(), sort in prop::sample::select(vec!["name", "price", "bogus"])) {
            let query = ListQuery { sort_by: Some(sort.to_string()), limit: Some(100), ..Default::default() };
            let plan = ListPlan::resolve(&query, &CONFIG);

            let first: Vec<_> = apply_plan(records.clone(), &plan).items.into_iter().map(|l| l.id).collect();
            let second: Vec<_> = apply_plan(records.clone(), &plan).items.into_iter().map(|l| l.id).collect();
            prop_assert_eq!(first, second);
        }
    }
}
