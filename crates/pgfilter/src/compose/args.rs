use crate::error::FilterResult;
use crate::sql::QueryBuilder;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Already-validated filter inputs, keyed by argument name.
///
/// Values are typed (string, integer, boolean or float) by the request layer. A `Null`
/// value or an empty string counts as absent. List arguments arrive either as an array or
/// as comma-separated text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterArgs {
    values: BTreeMap<String, Value>,
}

impl FilterArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// The value for `name`, unless it is absent, `Null` or an empty string.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.values.get(name)? {
            Value::Null => None,
            Value::Text(s) if s.is_empty() => None,
            v => Some(v),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// The elements of a list argument; comma-separated text is split, empty items dropped.
    pub fn list(&self, name: &str) -> Vec<Value> {
        match self.get(name) {
            None => Vec::new(),
            Some(Value::Text(s)) => s
                .split(',')
                .filter(|item| !item.is_empty())
                .map(Value::from)
                .collect(),
            Some(Value::Array(items)) => items.clone(),
            Some(scalar) => vec![scalar.clone()],
        }
    }

    /// Read `name` as an absent / single / set criterion.
    pub fn criterion(&self, name: &str) -> Criterion {
        Criterion::from_list(self.list(name))
    }

    /// Read an inclusive range from a pair of bound arguments.
    pub fn range(&self, min: &str, max: &str) -> Criterion {
        let min = self.get(min).cloned();
        let max = self.get(max).cloned();
        if min.is_none() && max.is_none() {
            Criterion::Absent
        } else {
            Criterion::Range { min, max }
        }
    }

    /// Present arguments whose name starts with `prefix`, in name order.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.values
            .keys()
            .filter(move |name| name.starts_with(prefix))
            .filter_map(move |name| Some((name.as_str(), self.get(name)?)))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = FilterArgs::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

/// How one filter dimension constrains a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Absent,
    One(Value),
    Set(Vec<Value>),
    /// Inclusive bounds; at least one is present.
    Range {
        min: Option<Value>,
        max: Option<Value>,
    },
}

impl Criterion {
    pub fn from_list(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => Criterion::Absent,
            1 => Criterion::One(values.remove(0)),
            _ => Criterion::Set(values),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Criterion::Absent)
    }

    /// Constrain `column` to this criterion. `Absent` is a no-op.
    pub fn apply(&self, query: &mut QueryBuilder, column: &str) -> FilterResult<()> {
        match self {
            Criterion::Absent => {}
            Criterion::One(v) => {
                query.add_equality(column, v.clone());
            }
            Criterion::Set(values) => {
                query.add_membership(column, Value::Array(values.clone()))?;
            }
            Criterion::Range { min, max } => {
                if let Some(min) = min {
                    query.add_comparison(column, ">=", min.clone());
                }
                if let Some(max) = max {
                    query.add_comparison(column, "<=", max.clone());
                }
            }
        }
        Ok(())
    }

    /// Exclude this criterion's values from `column`. Ranges are not excludable and are ignored.
    pub fn apply_exclusion(
        &self,
        query: &mut QueryBuilder,
        column: &str,
        include_null: bool,
    ) -> FilterResult<()> {
        let values = match self {
            Criterion::One(v) => vec![v.clone()],
            Criterion::Set(values) => values.clone(),
            Criterion::Absent | Criterion::Range { .. } => return Ok(()),
        };
        query.add_non_membership(column, Value::Array(values), include_null)?;
        Ok(())
    }
}
