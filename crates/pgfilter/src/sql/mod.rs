//! Dynamic statement builder.
//!
//! [`QueryBuilder`] accumulates one statement's conditions, `GROUP BY` columns and tail
//! clauses without making the caller track placeholder indices; [`RenderedSql`] is the
//! finished `(sql, params)` pair.
//!
//! # Example
//!
//! ```ignore
//! use pgfilter::QueryBuilder;
//!
//! let mut q = QueryBuilder::new("SELECT asset_id FROM atomicassets_assets asset");
//! q.add_equality("asset.contract", "atomicassets");
//! q.add_membership("asset.owner", vec!["alice", "bob"])?;
//! q.append_tail("ORDER BY asset.asset_id DESC");
//! q.add_pagination(1, 100);
//!
//! let rows = q.render().fetch_all(&client).await?;
//! ```

mod builder;
pub(crate) mod param;
mod rendered;

#[cfg(test)]
mod tests;

pub use builder::QueryBuilder;
pub use param::Placeholder;
pub use rendered::RenderedSql;
