use super::args::FilterArgs;
use crate::error::FilterResult;
use crate::membership::Sense;
use crate::sql::QueryBuilder;

/// Columns an allow/deny list applies to.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreylistColumns {
    /// Column matched by `collection_whitelist` / `collection_blacklist`.
    pub collection_name: Option<&'static str>,
    /// Columns matched by `account_whitelist` / `account_blacklist`.
    pub accounts: &'static [&'static str],
}

/// Apply collection and account allow/deny lists.
///
/// A deny list excludes a value from every account column (NULL accounts stay visible);
/// an allow list matches when any account column is in the list.
pub fn greylist_filter(
    query: &mut QueryBuilder,
    args: &FilterArgs,
    columns: &GreylistColumns,
) -> FilterResult<()> {
    if let Some(column) = columns.collection_name {
        let deny = args.list("collection_blacklist");
        if !deny.is_empty() {
            query.add_non_membership(column, deny, false)?;
        }

        let allow = args.list("collection_whitelist");
        if !allow.is_empty() {
            query.add_membership(column, allow)?;
        }
    }

    if columns.accounts.is_empty() {
        return Ok(());
    }

    let deny = args.list("account_blacklist");
    if !deny.is_empty() {
        for column in columns.accounts {
            query.add_non_membership(column, deny.clone(), true)?;
        }
    }

    let allow = args.list("account_whitelist");
    if !allow.is_empty() {
        let mut fragments = Vec::with_capacity(columns.accounts.len());
        for column in columns.accounts {
            fragments.push(query.membership_fragment(column, allow.clone(), Sense::Include)?);
        }
        query.add_raw_condition(fragments.join(" OR "));
    }

    Ok(())
}
