use super::param::params_ref;
use crate::client::GenericClient;
use crate::error::{FilterError, FilterResult};
use crate::value::Value;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

/// A finished statement: SQL with `$1..$n` placeholders plus the values behind them.
///
/// `params[i - 1]` is the value for `$i`.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<Value>,
    tag: Option<String>,
}

impl RenderedSql {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
            tag: None,
        }
    }

    /// Associate a tag for logging/observability.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Split into the `(sql, params)` pair handed to the execution layer.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        params_ref(&self.params)
    }

    /// Wrap this statement as `SELECT COUNT(*) FROM (...) x` with the same params.
    ///
    /// Build the count before appending `LIMIT`/`OFFSET`, or the count is capped by the page.
    pub fn into_count(self) -> Self {
        Self {
            sql: format!("SELECT COUNT(*) FROM ({}) x", self.sql),
            params: self.params,
            tag: self.tag,
        }
    }

    /// The SQL with every placeholder replaced by a literal form of its value.
    ///
    /// Literal substitution is not escaping-safe; this is for logs only and must never be
    /// executed.
    pub fn debug_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut rest = self.sql.as_str();

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            let value = after[..digits]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| self.params.get(i));

            match value {
                Some(value) => out.push_str(&value.to_literal()),
                None => {
                    out.push('$');
                    out.push_str(&after[..digits]);
                }
            }
            rest = &after[digits..];
        }
        out.push_str(rest);
        out
    }

    // ==================== Execution ====================

    /// Execute the statement and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> FilterResult<Vec<Row>> {
        conn.query_rendered(self).await
    }

    /// Execute the statement and return the **first** row.
    ///
    /// Returns [`FilterError::NotFound`] when no rows come back.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> FilterResult<Row> {
        let rows = self.fetch_all(conn).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| FilterError::not_found("Expected one row, got none"))
    }

    /// Execute the statement and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> FilterResult<Option<Row>> {
        let rows = self.fetch_all(conn).await?;
        Ok(rows.into_iter().next())
    }

    /// Execute the statement and return the first column of every row.
    pub async fn fetch_scalar_all<T>(&self, conn: &impl GenericClient) -> FilterResult<Vec<T>>
    where
        T: for<'b> FromSql<'b> + Send + Sync,
    {
        let rows = self.fetch_all(conn).await?;
        rows.iter()
            .map(|r| {
                r.try_get(0)
                    .map_err(|e| FilterError::decode("0", e.to_string()))
            })
            .collect()
    }

    /// Execute the statement and return the first column of the first row.
    ///
    /// Returns [`FilterError::NotFound`] when no rows come back.
    pub async fn fetch_scalar<T>(&self, conn: &impl GenericClient) -> FilterResult<T>
    where
        T: for<'b> FromSql<'b> + Send + Sync,
    {
        let row = self.fetch_one(conn).await?;
        row.try_get(0)
            .map_err(|e| FilterError::decode("0", e.to_string()))
    }

    /// Count the rows this statement would return.
    ///
    /// For a statement already built with [`into_count`](RenderedSql::into_count), use
    /// [`fetch_scalar`](RenderedSql::fetch_scalar) instead.
    pub async fn fetch_count(&self, conn: &impl GenericClient) -> FilterResult<i64> {
        self.clone().into_count().fetch_scalar(conn).await
    }
}
