use super::param::{ParamList, Placeholder};
use super::rendered::RenderedSql;
use crate::error::{FilterError, FilterResult};
use crate::membership::{self, Sense};
use crate::value::Value;

/// An incremental builder for one SQL statement.
///
/// `QueryBuilder` keeps the statement's base text, `WHERE` conditions, `GROUP BY` columns and
/// tail clauses apart from the bound values, and hands out `$n` placeholders only through
/// [`bind`](QueryBuilder::bind). Conditions are ANDed together at render time.
///
/// Column and table names passed to the typed helpers are interpolated verbatim: they must
/// be code constants, never request input.
#[must_use]
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base: String,
    conditions: Vec<String>,
    aggregations: Vec<String>,
    tail: Vec<String>,
    params: ParamList,
}

impl QueryBuilder {
    /// Create a builder from a base `SELECT ... FROM ...` fragment.
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_params(base, Vec::new())
    }

    /// Create a builder whose placeholders continue after `seed`.
    pub fn with_params(base: impl Into<String>, seed: Vec<Value>) -> Self {
        Self {
            base: base.into(),
            conditions: Vec::new(),
            aggregations: Vec::new(),
            tail: Vec::new(),
            params: ParamList::from_values(seed),
        }
    }

    /// Start a nested statement that shares this builder's ordinal space.
    ///
    /// Fold it back with [`fold_exists`](QueryBuilder::fold_exists).
    pub fn subquery(&self, base: impl Into<String>) -> Self {
        Self::with_params(base, self.params.values().to_vec())
    }

    /// Bind a value and return its placeholder.
    pub fn bind(&mut self, value: impl Into<Value>) -> Placeholder {
        self.params.push(value.into())
    }

    /// The values bound so far, in placeholder order.
    pub fn params(&self) -> &[Value] {
        self.params.values()
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Add a parenthesized raw condition.
    pub fn add_raw_condition(&mut self, sql: impl AsRef<str>) -> &mut Self {
        self.conditions.push(format!("({})", sql.as_ref()));
        self
    }

    /// Add `column = $n`.
    pub fn add_equality(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let p = self.bind(value);
        self.conditions.push(format!("{column} = {p}"));
        self
    }

    /// Add `column != $n`.
    pub fn add_inequality(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let p = self.bind(value);
        self.conditions.push(format!("{column} != {p}"));
        self
    }

    /// Add `column <op> $n` for a comparison operator (`<`, `<=`, `>`, `>=`).
    pub fn add_comparison(
        &mut self,
        column: &str,
        op: &'static str,
        value: impl Into<Value>,
    ) -> &mut Self {
        let p = self.bind(value);
        self.conditions.push(format!("{column} {op} {p}"));
        self
    }

    /// Bind `values` and return a membership fragment without adding it.
    ///
    /// Useful when several fragments are ORed into one condition.
    pub fn membership_fragment(
        &mut self,
        column: &str,
        values: impl Into<Value>,
        sense: Sense,
    ) -> FilterResult<String> {
        let values = values.into();
        let Some(list) = values.as_list() else {
            return Err(FilterError::input_shape(column, values.kind_name()));
        };
        Ok(membership::predicate(&mut self.params, column, list, sense))
    }

    /// Add "column is one of `values`".
    ///
    /// Returns [`FilterError::InputShape`] when `values` is not a list.
    pub fn add_membership(
        &mut self,
        column: &str,
        values: impl Into<Value>,
    ) -> FilterResult<&mut Self> {
        let fragment = self.membership_fragment(column, values, Sense::Include)?;
        self.conditions.push(fragment);
        Ok(self)
    }

    /// Add "column is not one of `values`", optionally also matching NULL.
    ///
    /// Returns [`FilterError::InputShape`] when `values` is not a list.
    pub fn add_non_membership(
        &mut self,
        column: &str,
        values: impl Into<Value>,
        include_null: bool,
    ) -> FilterResult<&mut Self> {
        let fragment = self.membership_fragment(column, values, Sense::Exclude)?;
        let fragment = if include_null {
            membership::or_null(&fragment, column)
        } else {
            fragment
        };
        self.conditions.push(fragment);
        Ok(self)
    }

    /// Add `column IS NULL` or `column IS NOT NULL`.
    pub fn add_null_check(&mut self, column: &str, is_null: bool) -> &mut Self {
        let check = if is_null { "IS NULL" } else { "IS NOT NULL" };
        self.conditions.push(format!("{column} {check}"));
        self
    }

    /// Add `left.column = right.column` for each column.
    pub fn add_join_equality(&mut self, left: &str, right: &str, columns: &[&str]) -> &mut Self {
        for column in columns {
            self.conditions.push(format!("{left}.{column} = {right}.{column}"));
        }
        self
    }

    /// Extend the `GROUP BY` list.
    pub fn add_group_columns(&mut self, columns: &[&str]) -> &mut Self {
        self.aggregations.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Append `LIMIT $a OFFSET $b` for a 1-based page.
    ///
    /// `page` and `limit` are expected to be validated (`>= 1`) by the caller.
    pub fn add_pagination(&mut self, page: i64, limit: i64) -> &mut Self {
        let limit_p = self.bind(limit);
        let offset_p = self.bind((page - 1) * limit);
        self.tail.push(format!("LIMIT {limit_p} OFFSET {offset_p}"));
        self
    }

    /// Append trailing SQL (`ORDER BY`, `LIMIT`, ...). Clauses render in call order.
    pub fn append_tail(&mut self, sql: impl Into<String>) -> &mut Self {
        self.tail.push(sql.into());
        self
    }

    /// Append raw SQL to the base statement, e.g. a `JOIN` discovered while composing.
    pub fn append_to_base(&mut self, sql: &str) -> &mut Self {
        self.base.push_str(sql);
        self
    }

    /// Replace the parameter list; the next placeholder continues from its length.
    pub fn adopt_params(&mut self, params: Vec<Value>) -> &mut Self {
        self.params.replace(params);
        self
    }

    /// Fold a nested statement into this one as `EXISTS(<subquery>)`.
    ///
    /// `sub` must have been started with [`subquery`](QueryBuilder::subquery) (or seeded with
    /// this builder's current params) so that its placeholders continue this builder's
    /// numbering; its final param list becomes this builder's.
    pub fn fold_exists(&mut self, sub: QueryBuilder) -> &mut Self {
        let fragment = self.exists_fragment(sub);
        self.add_raw_condition(fragment)
    }

    /// Adopt a nested statement's params and return `EXISTS(<subquery>)` without adding it.
    ///
    /// Use this when the existence check is one branch of a larger `OR` group.
    pub fn exists_fragment(&mut self, sub: QueryBuilder) -> String {
        debug_assert!(
            sub.params().starts_with(self.params()),
            "subquery must be seeded with the parent's params"
        );
        let (sql, params) = sub.render().into_parts();
        self.adopt_params(params);
        format!("EXISTS({sql})")
    }

    /// Assemble `base [WHERE ...] [GROUP BY ...] [tail ...]`.
    pub fn render(&self) -> RenderedSql {
        let mut sql = self.base.clone();

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }

        if !self.aggregations.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.aggregations.join(", "));
        }

        for clause in &self.tail {
            sql.push(' ');
            sql.push_str(clause);
        }

        RenderedSql::new(sql, self.params.values().to_vec())
    }

    /// Diagnostic rendering.
    ///
    /// With `inline_values`, each placeholder is replaced by a literal form of its value.
    /// The result is for humans only and must never be executed.
    pub fn debug(&self, inline_values: bool) -> (String, Vec<Value>) {
        let rendered = self.render();
        if inline_values {
            (rendered.debug_sql(), rendered.params)
        } else {
            (rendered.sql, rendered.params)
        }
    }
}
