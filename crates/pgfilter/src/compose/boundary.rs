use super::args::FilterArgs;
use crate::error::FilterResult;
use crate::sql::QueryBuilder;

/// Columns for id and time window filtering.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryColumns {
    /// Primary key column, matched by `ids`, `lower_bound` and `upper_bound`.
    pub primary: &'static str,
    /// Timestamp column (milliseconds), matched by `before` and `after`.
    pub date: Option<&'static str>,
}

/// Apply `ids`, `lower_bound` (inclusive), `upper_bound` (exclusive), `before` and `after`.
pub fn boundary_filter(
    query: &mut QueryBuilder,
    args: &FilterArgs,
    columns: &BoundaryColumns,
) -> FilterResult<()> {
    args.criterion("ids").apply(query, columns.primary)?;

    if let Some(lower) = args.get("lower_bound") {
        query.add_comparison(columns.primary, ">=", lower.clone());
    }
    if let Some(upper) = args.get("upper_bound") {
        query.add_comparison(columns.primary, "<", upper.clone());
    }

    if let Some(date) = columns.date {
        if let Some(before) = args.int("before") {
            query.add_comparison(date, "<", before);
        }
        if let Some(after) = args.int("after") {
            query.add_comparison(date, ">", after);
        }
    }

    Ok(())
}
