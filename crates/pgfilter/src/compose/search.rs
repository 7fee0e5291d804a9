//! Complete statements assembled from the per-dimension filters.

use super::args::FilterArgs;
use super::asset::{ASSETS_TABLE, AssetColumns, asset_filter};
use super::boundary::{BoundaryColumns, boundary_filter};
use super::data::data_filter;
use super::drop_state::{DropColumns, drop_state_filter};
use super::greylist::{GreylistColumns, greylist_filter};
use super::price::{PriceColumns, price_filter};
use super::sort::{SortOptions, SortOrder, page_filter, sort_filter};
use crate::error::FilterResult;
use crate::sql::{QueryBuilder, RenderedSql};
use chrono::{DateTime, Utc};

pub const DROPS_TABLE: &str = "neftydrops_drops";
pub const SALES_TABLE: &str = "atomicmarket_sales";
pub const TOKENS_TABLE: &str = "atomicmarket_tokens";
pub const OFFER_ASSETS_TABLE: &str = "atomicassets_offers_assets";

pub const ASSET_SORT: SortOptions = SortOptions {
    columns: &[
        ("asset_id", "asset.asset_id"),
        ("minted", "asset.minted_at_time"),
        ("updated", "asset.updated_at_time"),
        ("transferred", "asset.transferred_at_time"),
        ("template_mint", "asset.template_mint"),
    ],
    default_sort: "asset_id",
    default_order: SortOrder::Desc,
    tiebreak: Some("asset.asset_id"),
    default_limit: 100,
};

pub const COLLECTION_STATS_SORT: SortOptions = SortOptions {
    columns: &[("assets", "assets"), ("collection_name", "asset.collection_name")],
    default_sort: "assets",
    default_order: SortOrder::Desc,
    tiebreak: Some("asset.collection_name"),
    default_limit: 100,
};

pub const DROP_SORT: SortOptions = SortOptions {
    columns: &[
        ("created", "ndrop.created_at_time"),
        ("start_time", "ndrop.start_time"),
        ("end_time", "ndrop.end_time"),
        ("drop_id", "ndrop.drop_id"),
    ],
    default_sort: "created",
    default_order: SortOrder::Desc,
    tiebreak: Some("ndrop.drop_id"),
    default_limit: 100,
};

pub const SALE_SORT: SortOptions = SortOptions {
    columns: &[
        ("created", "listing.created_at_time"),
        ("updated", "listing.updated_at_time"),
        ("price", "listing.price"),
        ("sale_id", "listing.sale_id"),
    ],
    default_sort: "created",
    default_order: SortOrder::Desc,
    tiebreak: Some("listing.sale_id"),
    default_limit: 100,
};

/// A page query plus the matching unpaginated count query.
#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    pub items: RenderedSql,
    pub count: RenderedSql,
}

/// Render the count, then sort and paginate.
fn finish(mut query: QueryBuilder, args: &FilterArgs, sort: &SortOptions) -> FilterResult<Search> {
    let count = query.render().into_count();
    sort_filter(&mut query, args, sort)?;
    page_filter(&mut query, args, sort);
    Ok(Search {
        items: query.render(),
        count,
    })
}

/// Asset ids matching every asset, data, greylist and boundary argument.
pub fn asset_search(args: &FilterArgs, contract: &str) -> FilterResult<Search> {
    let mut query = QueryBuilder::new(format!("SELECT asset.asset_id FROM {ASSETS_TABLE} asset"));
    query.add_equality("asset.contract", contract);

    let columns = AssetColumns::default();
    asset_filter(&mut query, args, &columns)?;
    data_filter(&mut query, args, &columns)?;
    greylist_filter(
        &mut query,
        args,
        &GreylistColumns {
            collection_name: Some("asset.collection_name"),
            accounts: &["asset.owner"],
        },
    )?;
    boundary_filter(
        &mut query,
        args,
        &BoundaryColumns {
            primary: "asset.asset_id",
            date: Some("asset.minted_at_time"),
        },
    )?;

    finish(query, args, &ASSET_SORT)
}

/// Matching asset counts per collection.
pub fn collection_stats(args: &FilterArgs, contract: &str) -> FilterResult<Search> {
    let mut query = QueryBuilder::new(format!(
        "SELECT asset.collection_name, COUNT(*) AS assets FROM {ASSETS_TABLE} asset"
    ));
    query.add_equality("asset.contract", contract);

    asset_filter(&mut query, args, &AssetColumns::default())?;
    greylist_filter(
        &mut query,
        args,
        &GreylistColumns {
            collection_name: Some("asset.collection_name"),
            accounts: &[],
        },
    )?;
    query.add_group_columns(&["asset.collection_name"]);

    finish(query, args, &COLLECTION_STATS_SORT)
}

/// Drop ids filtered by collection, visibility and lifecycle state at `now`.
pub fn drop_search(args: &FilterArgs, contract: &str, now: DateTime<Utc>) -> FilterResult<Search> {
    let mut query = QueryBuilder::new(format!("SELECT ndrop.drop_id FROM {DROPS_TABLE} ndrop"));
    query.add_equality("ndrop.drops_contract", contract);

    args.criterion("collection_name")
        .apply(&mut query, "ndrop.collection_name")?;
    match args.flag("hidden") {
        Some(hidden) => query.add_equality("ndrop.is_hidden", hidden),
        None => query.add_equality("ndrop.is_hidden", false),
    };

    drop_state_filter(&mut query, args, &DropColumns::default(), now)?;
    greylist_filter(
        &mut query,
        args,
        &GreylistColumns {
            collection_name: Some("ndrop.collection_name"),
            accounts: &[],
        },
    )?;
    boundary_filter(
        &mut query,
        args,
        &BoundaryColumns {
            primary: "ndrop.drop_id",
            date: Some("ndrop.created_at_time"),
        },
    )?;

    finish(query, args, &DROP_SORT)
}

/// Marketplace sale ids; asset arguments match any asset in the sale's offer.
pub fn sale_search(args: &FilterArgs, market_contract: &str) -> FilterResult<Search> {
    let mut query = QueryBuilder::new(format!(
        "SELECT listing.sale_id FROM {SALES_TABLE} listing \
         JOIN {TOKENS_TABLE} listing_token ON listing_token.market_contract = listing.market_contract \
         AND listing_token.token_symbol = listing.settlement_symbol"
    ));
    query.add_equality("listing.market_contract", market_contract);

    args.criterion("state").apply(&mut query, "listing.state")?;
    args.criterion("seller").apply(&mut query, "listing.seller")?;
    args.criterion("buyer").apply(&mut query, "listing.buyer")?;

    price_filter(&mut query, args, &PriceColumns::default())?;

    let mut sub = query.subquery(format!(
        "SELECT FROM {OFFER_ASSETS_TABLE} offer_asset \
         JOIN {ASSETS_TABLE} asset ON asset.contract = offer_asset.contract \
         AND asset.asset_id = offer_asset.asset_id"
    ));
    sub.add_join_equality("offer_asset", "listing", &["offer_id"]);
    sub.add_raw_condition("offer_asset.contract = listing.assets_contract");
    let correlation = sub.conditions().len();

    let columns = AssetColumns::default();
    asset_filter(&mut sub, args, &columns)?;
    data_filter(&mut sub, args, &columns)?;
    if sub.conditions().len() > correlation {
        query.fold_exists(sub);
    }

    greylist_filter(
        &mut query,
        args,
        &GreylistColumns {
            collection_name: Some("listing.collection_name"),
            accounts: &["listing.seller", "listing.buyer"],
        },
    )?;
    boundary_filter(
        &mut query,
        args,
        &BoundaryColumns {
            primary: "listing.sale_id",
            date: Some("listing.created_at_time"),
        },
    )?;

    finish(query, args, &SALE_SORT)
}
