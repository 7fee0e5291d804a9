//! Filter composers.
//!
//! Each composer reads a few named arguments from [`FilterArgs`] and adds the matching
//! conditions to a [`QueryBuilder`](crate::sql::QueryBuilder). Composers are independent:
//! they can be applied in any order, and an absent argument adds nothing.
//!
//! ```ignore
//! use pgfilter::compose::{FilterArgs, asset_search};
//!
//! let args = FilterArgs::new()
//!     .with("owner", "alice")
//!     .with("collection_name", "gems,cards")
//!     .with("immutable_data.rarity", "epic");
//! let search = asset_search(&args, "atomicassets")?;
//! let total: i64 = search.count.fetch_scalar(&client).await?;
//! let rows = search.items.fetch_all(&client).await?;
//! ```

mod args;
mod asset;
mod boundary;
mod data;
mod drop_state;
mod greylist;
mod price;
mod search;
mod sort;


pub use args::{Criterion, FilterArgs};
pub use asset::{ASSETS_TABLE, AssetColumns, COLLECTIONS_TABLE, TEMPLATES_TABLE, asset_filter};
pub use boundary::{BoundaryColumns, boundary_filter};
pub use data::data_filter;
pub use drop_state::{DropColumns, DropState, drop_state_filter};
pub use greylist::{GreylistColumns, greylist_filter};
pub use price::{PriceColumns, price_filter};
pub use search::{
    ASSET_SORT, COLLECTION_STATS_SORT, DROP_SORT, DROPS_TABLE, OFFER_ASSETS_TABLE, SALE_SORT,
    SALES_TABLE, Search, TOKENS_TABLE, asset_search, collection_stats, drop_search, sale_search,
};
pub use sort::{SortOptions, SortOrder, page_filter, sort_filter};
