use super::args::FilterArgs;
use crate::error::FilterResult;
use crate::sql::QueryBuilder;

pub const ASSETS_TABLE: &str = "atomicassets_assets";
pub const TEMPLATES_TABLE: &str = "atomicassets_templates";
pub const COLLECTIONS_TABLE: &str = "atomicassets_collections";

/// Aliases the asset filters refer to.
#[derive(Debug, Clone, Copy)]
pub struct AssetColumns {
    /// Alias of the assets table in the base query.
    pub asset: &'static str,
    /// Alias the templates table has (or will get) in the base query.
    pub template: &'static str,
    /// Whether the base query already joins the templates table under `template`.
    pub template_joined: bool,
}

impl Default for AssetColumns {
    fn default() -> Self {
        Self {
            asset: "asset",
            template: "\"template\"",
            template_joined: false,
        }
    }
}

/// Apply the asset dimensions: ownership, template/schema/collection, burn state,
/// template flags, template allow/deny lists, mint range, duplicates and authorization.
pub fn asset_filter(
    query: &mut QueryBuilder,
    args: &FilterArgs,
    columns: &AssetColumns,
) -> FilterResult<()> {
    let a = columns.asset;
    let t = columns.template;

    args.criterion("owner").apply(query, &format!("{a}.owner"))?;

    if args.text("template_id") == Some("null") {
        query.add_null_check(&format!("{a}.template_id"), true);
    } else {
        args.criterion("template_id")
            .apply(query, &format!("{a}.template_id"))?;
    }

    args.criterion("schema_name")
        .apply(query, &format!("{a}.schema_name"))?;
    args.criterion("collection_name")
        .apply(query, &format!("{a}.collection_name"))?;

    if let Some(burned) = args.flag("burned") {
        query.add_null_check(&format!("{a}.owner"), burned);
    }

    let deny = args.list("template_blacklist");
    if !deny.is_empty() {
        query.add_non_membership(&format!("{a}.template_id"), deny, true)?;
    }
    let allow = args.list("template_whitelist");
    if !allow.is_empty() {
        query.add_membership(&format!("{a}.template_id"), allow)?;
    }

    args.range("min_template_mint", "max_template_mint")
        .apply(query, &format!("{a}.template_mint"))?;

    let transferable = args.flag("is_transferable");
    let burnable = args.flag("is_burnable");
    if (transferable.is_some() || burnable.is_some()) && !columns.template_joined {
        query.append_to_base(&format!(
            " LEFT JOIN {TEMPLATES_TABLE} {t} ON {t}.contract = {a}.contract AND {t}.template_id = {a}.template_id"
        ));
    }
    // Assets without a template are transferable and burnable.
    match transferable {
        Some(true) => {
            query.add_raw_condition(format!("{t}.transferable IS DISTINCT FROM FALSE"));
        }
        Some(false) => {
            query.add_raw_condition(format!("{t}.transferable = FALSE"));
        }
        None => {}
    }
    match burnable {
        Some(true) => {
            query.add_raw_condition(format!("{t}.burnable IS DISTINCT FROM FALSE"));
        }
        Some(false) => {
            query.add_raw_condition(format!("{t}.burnable = FALSE"));
        }
        None => {}
    }

    if args.flag("only_duplicate_templates") == Some(true) {
        query.add_null_check(&format!("{a}.template_id"), false);
        let mut sub = query.subquery(format!("SELECT FROM {ASSETS_TABLE} inner_asset"));
        sub.add_join_equality("inner_asset", a, &["contract", "template_id", "owner"]);
        sub.add_raw_condition(format!("inner_asset.asset_id < {a}.asset_id"));
        query.fold_exists(sub);
    }

    if let Some(account) = args.get("authorized_account") {
        let mut sub = query.subquery(format!("SELECT FROM {COLLECTIONS_TABLE} auth_collection"));
        sub.add_join_equality("auth_collection", a, &["contract", "collection_name"]);
        let p = sub.bind(account.clone());
        sub.add_raw_condition(format!("{p} = ANY(auth_collection.authorized_accounts)"));
        query.fold_exists(sub);
    }

    Ok(())
}
