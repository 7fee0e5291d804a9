//! Attribute filters over JSONB data columns.
//!
//! Argument names follow `<source>[:<type>].<attribute>`:
//!
//! - `immutable_data.name=Rock` matches `asset.immutable_data`
//! - `mutable_data.level=3` matches `asset.mutable_data`
//! - `template_data.rarity=epic` matches the template's immutable data (correlated `EXISTS`)
//! - `data.name=Rock` matches any of the three
//!
//! The optional type (`text`, `number`, `bool`) fixes the JSON type of the comparison value,
//! e.g. `data:number.level=3` matches `{"level": 3}` rather than `{"level": "3"}`.

use super::args::FilterArgs;
use super::asset::{AssetColumns, TEMPLATES_TABLE};
use crate::error::{FilterError, FilterResult};
use crate::sql::QueryBuilder;
use crate::value::Value;
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Any,
    Immutable,
    Mutable,
    Template,
}

impl Source {
    const ALL: [Source; 4] = [
        Source::Any,
        Source::Immutable,
        Source::Mutable,
        Source::Template,
    ];

    fn prefix(self) -> &'static str {
        match self {
            Source::Any => "data",
            Source::Immutable => "immutable_data",
            Source::Mutable => "mutable_data",
            Source::Template => "template_data",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.prefix() == s)
    }
}

/// Split `<source>[:<type>].<attribute>` into its parts.
fn parse_key(name: &str) -> Option<(Source, Option<&str>, &str)> {
    let (head, attribute) = name.split_once('.')?;
    if attribute.is_empty() {
        return None;
    }
    let (source, ty) = match head.split_once(':') {
        Some((source, ty)) => (source, Some(ty)),
        None => (head, None),
    };
    Some((Source::parse(source)?, ty, attribute))
}

fn coerce(name: &str, ty: Option<&str>, value: &Value) -> FilterResult<Json> {
    match ty {
        None => Ok(value.to_json()),
        Some("text") => value
            .to_text()
            .map(Json::String)
            .ok_or_else(|| FilterError::invalid_argument(name, "expected a text value")),
        Some("number") => {
            if let Some(n) = value.as_i64() {
                Ok(Json::from(n))
            } else {
                value
                    .as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .ok_or_else(|| FilterError::invalid_argument(name, "expected a number"))
            }
        }
        Some("bool") => value
            .as_bool()
            .map(Json::Bool)
            .ok_or_else(|| FilterError::invalid_argument(name, "expected a boolean")),
        Some(other) => Err(FilterError::invalid_argument(
            name,
            format!("unknown data type '{other}'"),
        )),
    }
}

/// Correlated subquery over the asset's template, sharing `query`'s ordinal space.
fn template_subquery(query: &QueryBuilder, a: &str, alias: &str) -> QueryBuilder {
    let mut sub = query.subquery(format!("SELECT FROM {TEMPLATES_TABLE} {alias}"));
    sub.add_join_equality(alias, a, &["contract", "template_id"]);
    sub
}

/// Apply every data attribute argument in `args`.
pub fn data_filter(
    query: &mut QueryBuilder,
    args: &FilterArgs,
    columns: &AssetColumns,
) -> FilterResult<()> {
    let a = columns.asset;

    let mut immutable = Map::new();
    let mut mutable = Map::new();
    let mut template = Map::new();
    let mut any = Vec::new();

    for source in Source::ALL {
        for (name, value) in args.with_prefix(source.prefix()) {
            // `data` also prefixes unrelated names such as `data_version`.
            let Some((parsed, ty, attribute)) = parse_key(name) else {
                continue;
            };
            if parsed != source {
                continue;
            }
            let value = coerce(name, ty, value)?;
            match source {
                Source::Immutable => {
                    immutable.insert(attribute.to_string(), value);
                }
                Source::Mutable => {
                    mutable.insert(attribute.to_string(), value);
                }
                Source::Template => {
                    template.insert(attribute.to_string(), value);
                }
                Source::Any => any.push((attribute.to_string(), value)),
            }
        }
    }

    if !immutable.is_empty() {
        let p = query.bind(Value::Json(Json::Object(immutable)));
        query.add_raw_condition(format!("{a}.immutable_data @> {p}::jsonb"));
    }
    if !mutable.is_empty() {
        let p = query.bind(Value::Json(Json::Object(mutable)));
        query.add_raw_condition(format!("{a}.mutable_data @> {p}::jsonb"));
    }
    if !template.is_empty() {
        let mut sub = template_subquery(query, a, "data_template");
        let p = sub.bind(Value::Json(Json::Object(template)));
        sub.add_raw_condition(format!("data_template.immutable_data @> {p}::jsonb"));
        query.fold_exists(sub);
    }

    // Each `data.` attribute may come from any source, so it is matched per attribute.
    for (attribute, value) in any {
        let mut object = Map::new();
        object.insert(attribute, value);
        let p = query.bind(Value::Json(Json::Object(object)));

        let mut sub = template_subquery(query, a, "any_template");
        sub.add_raw_condition(format!("any_template.immutable_data @> {p}::jsonb"));
        let exists = query.exists_fragment(sub);

        query.add_raw_condition(format!(
            "{a}.mutable_data @> {p}::jsonb OR {a}.immutable_data @> {p}::jsonb OR {exists}"
        ));
    }

    Ok(())
}
