//! # pgfilter
//!
//! Parameter-safe dynamic filter composition for read-only PostgreSQL APIs.
//!
//! ## Features
//!
//! - **Parameters only**: every caller-supplied value is bound as a `$n` placeholder
//! - **Adaptive membership**: list filters become `=`, `= ANY(...)` or an unnested `EXISTS`
//!   depending on list length
//! - **Nested statements**: correlated subqueries share their parent's placeholder numbering
//! - **Composable filters**: asset, data, greylist, boundary, price, drop state and sorting
//! - **SQL logging**: optional `tracing` output for every executed statement
//!
//! ## Query builder
//!
//! ```ignore
//! use pgfilter::QueryBuilder;
//!
//! let mut q = QueryBuilder::new("SELECT asset_id FROM atomicassets_assets asset");
//! q.add_equality("asset.owner", "alice");
//! q.add_membership("asset.collection_name", vec!["gems", "cards"])?;
//! q.add_pagination(1, 100);
//!
//! let rows = q.render().fetch_all(&client).await?;
//! ```

pub mod client;
pub mod compose;
pub mod error;
pub mod membership;
pub mod sql;
pub mod value;

#[cfg(feature = "tracing")]
pub mod log;

pub use client::GenericClient;
pub use compose::{
    Criterion, FilterArgs, Search, asset_filter, asset_search, boundary_filter, collection_stats,
    data_filter, drop_search, drop_state_filter, greylist_filter, page_filter, price_filter,
    sale_search, sort_filter,
};
pub use error::{FilterError, FilterResult};
pub use membership::{Sense, UNNEST_THRESHOLD};
pub use sql::{Placeholder, QueryBuilder, RenderedSql};
pub use value::Value;

#[cfg(feature = "tracing")]
pub use log::{LoggedClient, SqlLogger};
