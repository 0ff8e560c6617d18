//! # stay-queries
//!
//! Listing primitives shared by every collection endpoint.
//!
//! ## Structure
//!
//! - `filters` - Free-text matching of records across fields
//! - `sorts` - Field comparison and record ordering
//! - `query` - Per-resource list configuration and resolved plans
//! - `paginate` - The paginator and the page source seam
//!
//! ## Example
//!
//! ```
//! use stay_core::ListQuery;
//! use stay_queries::{ListConfig, ListPlan};
//!
//! const PROPERTIES: ListConfig = ListConfig::new(&["name", "created_at"], "name")
//!     .searching(&["name", "location"]);
//!
//! let query = ListQuery { sort_by: Some("bogus".into()), ..Default::default() };
//! let plan = ListPlan::resolve(&query, &PROPERTIES);
//!
//! assert_eq!(plan.sort_field, "name");
//! assert_eq!((plan.offset, plan.limit), (0, 10));
//! ```

pub mod filters;
pub mod paginate;
pub mod query;
pub mod sorts;

// Re-exports for convenience
pub use filters::{matches, FieldValue, MatchMode, Record, TextFilter};
pub use paginate::{apply_plan, paginate, paginate_plan, Page, PageSource};
pub use query::{ListConfig, ListPlan, DEFAULT_MAX_LIMIT};
pub use sorts::{compare, sort_records};
