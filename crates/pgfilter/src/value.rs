//! Dynamically typed bound values.
//!
//! Filter inputs reach the composer already typed, but not statically: the same argument
//! may arrive as an integer or as a stringified integer, and a list argument is bound as a
//! single array parameter. [`Value`] carries that shape and encodes itself for whatever
//! parameter type Postgres inferred for the placeholder it is bound to.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, to_sql_checked};

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<Value>),
    /// A JSON object (or any JSON document that is not a plain scalar/list).
    Json(serde_json::Value),
}

/// Parse `s` as an `i64` only if it renders back to exactly the same text.
///
/// This rejects `+1`, `01`, `-0`, ` 1`, `1.0` and anything outside the `i64` range.
pub fn parse_strict_i64(s: &str) -> Option<i64> {
    let n: i64 = s.parse().ok()?;
    (n.to_string() == s).then_some(n)
}

impl Value {
    /// A short name for the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The elements when this value is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value survives a lossless trip through 64-bit integer parsing.
    pub fn is_integer_like(&self) -> bool {
        match self {
            Value::Int(_) => true,
            Value::Float(f) => integral_f64(*f).is_some(),
            Value::Text(s) => parse_strict_i64(s).is_some(),
            _ => false,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => integral_f64(*f),
            Value::Text(s) => parse_strict_i64(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            Value::Text(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// The textual form of a scalar, as bound to a text-typed parameter.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Json(v) => Some(v.to_string()),
            Value::Null | Value::Array(_) => None,
        }
    }

    /// Convert into a JSON document.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => items.iter().map(Value::to_json).collect(),
            Value::Json(v) => v.clone(),
        }
    }

    /// Render as a SQL literal for diagnostics.
    ///
    /// Arrays become `ARRAY[...]` with every element quoted. The output is not an escaping
    /// guarantee and must never be executed.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => quote_literal(s),
            Value::Json(v) => quote_literal(&v.to_string()),
            Value::Array(items) => {
                let inner: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::Null => "NULL".to_string(),
                        other => quote_literal(&other.to_text().unwrap_or_default()),
                    })
                    .collect();
                format!("ARRAY[{}]", inner.join(","))
            }
        }
    }

    fn mismatch(&self, ty: &Type) -> Box<dyn Error + Sync + Send> {
        format!("cannot bind {} value to parameter of type {}", self.kind_name(), ty).into()
    }
}

fn integral_f64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Quote a string literal, doubling embedded single quotes.
fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }

        if let Kind::Array(_) = ty.kind() {
            return match self {
                Value::Array(items) => items.to_sql(ty, out),
                other => Err(other.mismatch(ty)),
            };
        }

        match *ty {
            Type::BOOL => {
                let b = self.as_bool().ok_or_else(|| self.mismatch(ty))?;
                b.to_sql(ty, out)
            }
            Type::INT2 => {
                let n = self.as_i64().ok_or_else(|| self.mismatch(ty))?;
                i16::try_from(n)?.to_sql(ty, out)
            }
            Type::INT4 => {
                let n = self.as_i64().ok_or_else(|| self.mismatch(ty))?;
                i32::try_from(n)?.to_sql(ty, out)
            }
            Type::INT8 => {
                let n = self.as_i64().ok_or_else(|| self.mismatch(ty))?;
                n.to_sql(ty, out)
            }
            Type::FLOAT4 => {
                let f = self.as_f64().ok_or_else(|| self.mismatch(ty))?;
                (f as f32).to_sql(ty, out)
            }
            Type::FLOAT8 => {
                let f = self.as_f64().ok_or_else(|| self.mismatch(ty))?;
                f.to_sql(ty, out)
            }
            Type::JSON | Type::JSONB => {
                let doc = match self {
                    Value::Text(s) => serde_json::from_str(s)
                        .unwrap_or_else(|_| serde_json::Value::String(s.clone())),
                    other => other.to_json(),
                };
                doc.to_sql(ty, out)
            }
            _ if <&str as ToSql>::accepts(ty) => {
                let text = self.to_text().ok_or_else(|| self.mismatch(ty))?;
                text.as_str().to_sql(ty, out)
            }
            _ => Err(self.mismatch(ty)),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::Json(obj),
        }
    }
}
