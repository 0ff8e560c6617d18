//! List plan to SQL translation
//!
//! Turns a [`ListPlan`] into WHERE, ORDER BY, and LIMIT/OFFSET clauses on a
//! `QueryBuilder`. Field names are mapped through a fixed column table, so only
//! known columns ever reach the SQL text; every client value is bound.

use sqlx::{Postgres, QueryBuilder};
use stay_core::{Id, SortDirection};
use stay_queries::{ListPlan, MatchMode, TextFilter};

/// Collation for text sort keys.
///
/// The ICU root locale matches the collator used for in-memory listings, so
/// both stores order accented and mixed-case names the same way whatever the
/// database's default collation is. Requires a PostgreSQL build with ICU.
pub const TEXT_SORT_COLLATION: &str = "und-x-icu";

/// How a column is compared and ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Searched case-insensitively; ordered by `lower()` under [`TEXT_SORT_COLLATION`]
    Text,
    Number,
    Bool,
    /// Dates and timestamps; searched through their text form
    Temporal,
}

/// A record field backed by a SQL expression
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub field: &'static str,
    pub expr: &'static str,
    pub kind: ColumnKind,
}

const fn column(field: &'static str, expr: &'static str, kind: ColumnKind) -> Column {
    Column { field, expr, kind }
}

/// Listable columns of `properties p`
pub const PROPERTY_COLUMNS: &[Column] = &[
    column("id", "p.id::text", ColumnKind::Text),
    column("user_id", "p.user_id::text", ColumnKind::Text),
    column("name", "p.name", ColumnKind::Text),
    column("description", "p.description", ColumnKind::Text),
    column("location", "p.location", ColumnKind::Text),
    column("price_per_night", "p.price_per_night", ColumnKind::Number),
    column("availability", "p.availability", ColumnKind::Bool),
    column("created_at", "p.created_at", ColumnKind::Temporal),
];

/// Listable columns of `bookings b` joined with `properties p` and `profiles u`
pub const BOOKING_COLUMNS: &[Column] = &[
    column("id", "b.id::text", ColumnKind::Text),
    column("property_id", "b.property_id::text", ColumnKind::Text),
    column("user_id", "b.user_id::text", ColumnKind::Text),
    column("check_in_date", "b.check_in_date", ColumnKind::Temporal),
    column("check_out_date", "b.check_out_date", ColumnKind::Temporal),
    column("total_price", "b.total_price", ColumnKind::Number),
    column("created_at", "b.created_at", ColumnKind::Temporal),
    column("property.name", "p.name", ColumnKind::Text),
    column("property.location", "p.location", ColumnKind::Text),
    column("property.price_per_night", "p.price_per_night", ColumnKind::Number),
    column("user.name", "u.name", ColumnKind::Text),
    column("user.email", "u.email", ColumnKind::Text),
];

/// Column table plus the id expression used to break ties
#[derive(Debug, Clone, Copy)]
pub struct ListingColumns {
    pub columns: &'static [Column],
    pub id_expr: &'static str,
}

impl ListingColumns {
    pub const PROPERTIES: Self = Self {
        columns: PROPERTY_COLUMNS,
        id_expr: "p.id",
    };

    pub const BOOKINGS: Self = Self {
        columns: BOOKING_COLUMNS,
        id_expr: "b.id",
    };

    pub fn column(&self, field: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Push `WHERE ...` for the plan's filters and an optional equality scope.
    ///
    /// Pushes nothing when there is nothing to restrict.
    pub fn push_where(
        &self,
        builder: &mut QueryBuilder<'static, Postgres>,
        plan: &ListPlan,
        scope: Option<(&'static str, Id)>,
    ) {
        let mut first = true;
        let mut next = |builder: &mut QueryBuilder<'static, Postgres>| {
            builder.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        if let Some((expr, id)) = scope {
            next(builder);
            builder.push(expr).push(" = ").push_bind(id);
        }

        for filter in &plan.filters {
            next(builder);
            self.push_filter(builder, filter);
        }
    }

    /// Push one filter as a parenthesized OR over its fields
    fn push_filter(&self, builder: &mut QueryBuilder<'static, Postgres>, filter: &TextFilter) {
        builder.push("(");
        let mut any = false;
        for field in &filter.fields {
            let Some(column) = self.column(field) else {
                continue;
            };
            if any {
                builder.push(" OR ");
            }
            push_condition(builder, column, &filter.text, filter.mode);
            any = true;
        }
        if !any {
            builder.push("FALSE");
        }
        builder.push(")");
    }

    /// Push `ORDER BY` on the plan's sort field, ties broken by id
    pub fn push_order(&self, builder: &mut QueryBuilder<'static, Postgres>, plan: &ListPlan) {
        let direction = match plan.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };

        builder.push(" ORDER BY ");
        if let Some(column) = self.column(plan.sort_field) {
            match column.kind {
                ColumnKind::Text => builder.push(format!(
                    "lower({}) COLLATE \"{}\" {}",
                    column.expr, TEXT_SORT_COLLATION, direction
                )),
                _ => builder.push(format!("{} {}", column.expr, direction)),
            };
            builder.push(", ");
        }
        builder.push(self.id_expr).push(" ASC");
    }

    /// Push `LIMIT` and `OFFSET` binds
    pub fn push_window(&self, builder: &mut QueryBuilder<'static, Postgres>, plan: &ListPlan) {
        builder
            .push(" LIMIT ")
            .push_bind(plan.limit.max(0))
            .push(" OFFSET ")
            .push_bind(plan.offset.max(0));
    }
}

fn push_condition(
    builder: &mut QueryBuilder<'static, Postgres>,
    column: &Column,
    text: &str,
    mode: MatchMode,
) {
    match column.kind {
        ColumnKind::Text => push_text_condition(builder, column.expr, text, mode),
        ColumnKind::Temporal => {
            let expr = format!("{}::text", column.expr);
            push_text_condition(builder, &expr, text, mode);
        }
        ColumnKind::Number => match text.trim().parse::<f64>() {
            Ok(value) => {
                builder.push(column.expr).push(" = ").push_bind(value);
            }
            Err(_) => {
                builder.push("FALSE");
            }
        },
        ColumnKind::Bool => match text.trim().parse::<bool>() {
            Ok(value) => {
                builder.push(column.expr).push(" = ").push_bind(value);
            }
            Err(_) => {
                builder.push("FALSE");
            }
        },
    }
}

fn push_text_condition(builder: &mut QueryBuilder<'static, Postgres>, expr: &str, text: &str, mode: MatchMode) {
    match mode {
        MatchMode::Partial => {
            builder
                .push(expr)
                .push(" ILIKE ")
                .push_bind(format!("%{}%", escape_like(text)));
        }
        MatchMode::Exact => {
            builder
                .push("lower(")
                .push(expr)
                .push(") = lower(")
                .push_bind(text.to_string())
                .push(")");
        }
    }
}

/// Escape LIKE wildcards so they match literally
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
