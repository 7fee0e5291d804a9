//! Positional parameter storage.

use crate::value::Value;
use std::fmt;
use tokio_postgres::types::ToSql;

/// A `$n` marker referencing a bound value.
///
/// The only way to obtain one is [`QueryBuilder::bind`](crate::QueryBuilder::bind), so every
/// placeholder that appears in rendered SQL has a value behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder(usize);

impl Placeholder {
    /// The 1-based ordinal (`n` in `$n`).
    pub fn ordinal(self) -> usize {
        self.0
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Ordered, append-only parameter list.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ParamList {
    params: Vec<Value>,
}

impl ParamList {
    pub(crate) fn from_values(params: Vec<Value>) -> Self {
        Self { params }
    }

    /// Add a parameter and return its placeholder.
    pub(crate) fn push(&mut self, value: Value) -> Placeholder {
        self.params.push(value);
        Placeholder(self.params.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn values(&self) -> &[Value] {
        &self.params
    }

    /// Replace the whole list; the next placeholder continues from the new length.
    pub(crate) fn replace(&mut self, params: Vec<Value>) {
        self.params = params;
    }
}

/// Parameter refs compatible with `tokio-postgres`.
pub(crate) fn params_ref(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}
