use super::args::FilterArgs;
use crate::error::FilterResult;
use crate::sql::QueryBuilder;

/// Columns of a priced listing and its settlement token.
#[derive(Debug, Clone, Copy)]
pub struct PriceColumns {
    /// Price in the token's smallest unit.
    pub price: &'static str,
    /// Decimal precision of the settlement token.
    pub precision: &'static str,
    /// Settlement token symbol.
    pub symbol: &'static str,
}

impl Default for PriceColumns {
    fn default() -> Self {
        Self {
            price: "listing.price",
            precision: "listing_token.token_precision",
            symbol: "listing.settlement_symbol",
        }
    }
}

/// Apply `symbol`, `min_price` and `max_price`.
///
/// Bounds are given in whole token units and scaled by the token's precision in SQL.
pub fn price_filter(
    query: &mut QueryBuilder,
    args: &FilterArgs,
    columns: &PriceColumns,
) -> FilterResult<()> {
    if let Some(symbol) = args.text("symbol") {
        query.add_equality(columns.symbol, symbol);
    }

    let precision = columns.precision;
    if let Some(min) = args.float("min_price") {
        let p = query.bind(min);
        query.add_raw_condition(format!(
            "{} >= {p} * POWER(10, {precision})",
            columns.price
        ));
    }
    if let Some(max) = args.float("max_price") {
        let p = query.bind(max);
        query.add_raw_condition(format!(
            "{} <= {p} * POWER(10, {precision})",
            columns.price
        ));
    }

    Ok(())
}
