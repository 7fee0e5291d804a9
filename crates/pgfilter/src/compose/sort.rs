use super::args::FilterArgs;
use crate::error::{FilterError, FilterResult};
use crate::sql::QueryBuilder;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortOrder {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ASC" => Ok(SortOrder::Asc),
            "desc" | "DESC" => Ok(SortOrder::Desc),
            other => Err(FilterError::invalid_argument(
                "order",
                format!("expected 'asc' or 'desc', got '{other}'"),
            )),
        }
    }
}

/// Allowed sort keys and paging defaults for one endpoint.
#[derive(Debug, Clone, Copy)]
pub struct SortOptions {
    /// `(sort argument value, column expression)` pairs.
    pub columns: &'static [(&'static str, &'static str)],
    pub default_sort: &'static str,
    pub default_order: SortOrder,
    /// Appended after the sort column so pages are stable.
    pub tiebreak: Option<&'static str>,
    pub default_limit: i64,
}

/// Append `ORDER BY` from the `sort` and `order` arguments.
pub fn sort_filter(
    query: &mut QueryBuilder,
    args: &FilterArgs,
    options: &SortOptions,
) -> FilterResult<()> {
    let key = args.text("sort").unwrap_or(options.default_sort);
    let Some(&(_, column)) = options.columns.iter().find(|(name, _)| *name == key) else {
        return Err(FilterError::invalid_argument(
            "sort",
            format!("unknown sort key '{key}'"),
        ));
    };

    let order = match args.text("order") {
        Some(order) => order.parse()?,
        None => options.default_order,
    };

    let mut clause = format!("ORDER BY {column} {order} NULLS LAST");
    if let Some(tiebreak) = options.tiebreak.filter(|t| *t != column) {
        clause.push_str(&format!(", {tiebreak} {order}"));
    }
    query.append_tail(clause);
    Ok(())
}

/// Append `LIMIT`/`OFFSET` from the `page` and `limit` arguments.
pub fn page_filter(query: &mut QueryBuilder, args: &FilterArgs, options: &SortOptions) {
    let page = args.int("page").unwrap_or(1);
    let limit = args.int("limit").unwrap_or(options.default_limit);
    query.add_pagination(page, limit);
}
