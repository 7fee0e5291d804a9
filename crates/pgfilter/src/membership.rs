//! Membership predicate strategy.
//!
//! Chooses how a "column is (not) one of these values" test is expressed, based on the
//! number of values:
//!
//! | values | include                                            | exclude              |
//! |--------|----------------------------------------------------|----------------------|
//! | 0      | `1=0`                                              | `1=1`                |
//! | 1      | `col = $n`                                         | `col != $n`          |
//! | 2..=10 | `col = ANY($n)`                                    | `col != ALL($n)`     |
//! | > 10   | `EXISTS (SELECT FROM UNNEST($n::T[]) u(c) WHERE u.c = col)` | `NOT EXISTS (...)` |
//!
//! Large lists are unnested into a derived relation so the planner can join against them
//! instead of probing a long `ANY` array. Every shape binds at most one parameter.

use crate::sql::param::ParamList;
use crate::value::Value;

/// Lists longer than this are unnested into an `EXISTS` subquery.
pub const UNNEST_THRESHOLD: usize = 10;

/// Whether the predicate tests membership or non-membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Include,
    Exclude,
}

/// The predicate form chosen for a list of a given length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Empty,
    Scalar,
    Any,
    Unnest,
}

impl Shape {
    pub fn for_len(len: usize) -> Self {
        match len {
            0 => Shape::Empty,
            1 => Shape::Scalar,
            n if n <= UNNEST_THRESHOLD => Shape::Any,
            _ => Shape::Unnest,
        }
    }
}

/// Element type used when casting an unnested array parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayCast {
    BigInt,
    Text,
}

impl ArrayCast {
    /// `BIGINT[]` when every element is integer-like, `TEXT[]` otherwise.
    ///
    /// Stringified integers count as integers: large ids are often decoded as strings to
    /// avoid precision loss, and casting them to `TEXT[]` would fail against a numeric column.
    pub fn infer(values: &[Value]) -> Self {
        if values.iter().all(Value::is_integer_like) {
            ArrayCast::BigInt
        } else {
            ArrayCast::Text
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            ArrayCast::BigInt => "BIGINT[]",
            ArrayCast::Text => "TEXT[]",
        }
    }
}

/// Bind `values` into `params` and return the predicate fragment.
pub(crate) fn predicate(
    params: &mut ParamList,
    column: &str,
    values: &[Value],
    sense: Sense,
) -> String {
    let shape = Shape::for_len(values.len());

    #[cfg(feature = "tracing")]
    tracing::trace!(
        target: "pgfilter.compose",
        column,
        len = values.len(),
        shape = ?shape,
        sense = ?sense,
        "membership predicate"
    );

    match (shape, sense) {
        (Shape::Empty, Sense::Include) => "1=0".to_string(),
        (Shape::Empty, Sense::Exclude) => "1=1".to_string(),
        (Shape::Scalar, Sense::Include) => {
            let p = params.push(values[0].clone());
            format!("{column} = {p}")
        }
        (Shape::Scalar, Sense::Exclude) => {
            let p = params.push(values[0].clone());
            format!("{column} != {p}")
        }
        (Shape::Any, Sense::Include) => {
            let p = params.push(Value::Array(values.to_vec()));
            format!("{column} = ANY({p})")
        }
        (Shape::Any, Sense::Exclude) => {
            let p = params.push(Value::Array(values.to_vec()));
            format!("{column} != ALL({p})")
        }
        (Shape::Unnest, _) => {
            let cast = ArrayCast::infer(values).as_sql();
            let p = params.push(Value::Array(values.to_vec()));
            let exists =
                format!("EXISTS (SELECT FROM UNNEST({p}::{cast}) u(c) WHERE u.c = {column})");
            match sense {
                Sense::Include => exists,
                Sense::Exclude => format!("NOT {exists}"),
            }
        }
    }
}

/// `(fragment OR column IS NULL)`.
///
/// `!= ALL` and `NOT EXISTS` never match a NULL column, so callers that want NULL rows
/// included in a deny-list result must ask for them.
pub(crate) fn or_null(fragment: &str, column: &str) -> String {
    format!("({fragment} OR {column} IS NULL)")
}
