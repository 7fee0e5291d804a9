use super::*;
use crate::error::FilterError;
use crate::membership::Sense;
use crate::value::Value;

fn letters(n: usize) -> Vec<Value> {
    (b'a'..).take(n).map(|c| Value::Text((c as char).to_string())).collect()
}

/// Collect every `$n` ordinal referenced in `sql`.
fn ordinals(sql: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut rest = sql;
    while let Some(pos) = rest.find('$') {
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if let Ok(n) = after[..digits].parse() {
            out.push(n);
        }
        rest = &after[digits..];
    }
    out.sort_unstable();
    out.dedup();
    out
}

#[test]
fn bind_returns_post_append_ordinal() {
    let mut q = QueryBuilder::new("SELECT 1");
    assert_eq!(q.bind(1).to_string(), "$1");
    assert_eq!(q.bind("x").to_string(), "$2");
    assert_eq!(q.param_count(), 2);
}

#[test]
fn seeded_params_continue_numbering() {
    let mut q = QueryBuilder::with_params("SELECT 1", vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(q.bind(3).ordinal(), 3);
}

#[test]
fn renders_without_clauses_when_empty() {
    let q = QueryBuilder::new("SELECT id FROM items");
    let rendered = q.render();
    assert_eq!(rendered.sql, "SELECT id FROM items");
    assert!(rendered.params.is_empty());
}

#[test]
fn equality_and_inequality_are_unparenthesized() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_equality("owner", "alice").add_inequality("kind", 3);
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items WHERE owner = $1 AND kind != $2"
    );
    assert_eq!(q.params(), &[Value::from("alice"), Value::Int(3)]);
}

#[test]
fn raw_condition_is_parenthesized() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_raw_condition("a = 1 OR b = 2");
    assert_eq!(q.render().sql, "SELECT id FROM items WHERE (a = 1 OR b = 2)");
}

#[test]
fn null_checks() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_null_check("owner", true).add_null_check("burned_at", false);
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items WHERE owner IS NULL AND burned_at IS NOT NULL"
    );
    assert_eq!(q.param_count(), 0);
}

#[test]
fn join_equality_binds_nothing() {
    let mut q = QueryBuilder::new("SELECT FROM templates t");
    q.add_join_equality("t", "asset", &["contract", "template_id"]);
    assert_eq!(
        q.render().sql,
        "SELECT FROM templates t WHERE t.contract = asset.contract AND t.template_id = asset.template_id"
    );
    assert_eq!(q.param_count(), 0);
}

#[test]
fn group_by_renders_after_where() {
    let mut q = QueryBuilder::new("SELECT collection_name, COUNT(*) FROM items");
    q.add_equality("contract", "atomicassets");
    q.add_group_columns(&["collection_name", "schema_name"]);
    q.append_tail("ORDER BY 2 DESC");
    assert_eq!(
        q.render().sql,
        "SELECT collection_name, COUNT(*) FROM items WHERE contract = $1 \
         GROUP BY collection_name, schema_name ORDER BY 2 DESC"
    );
}

#[test]
fn pagination_binds_limit_then_offset() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.append_tail("ORDER BY id");
    q.add_pagination(3, 25);
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items ORDER BY id LIMIT $1 OFFSET $2"
    );
    assert_eq!(q.params(), &[Value::Int(25), Value::Int(50)]);
}

#[test]
fn append_to_base_splices_before_where() {
    let mut q = QueryBuilder::new("SELECT a.id FROM items a");
    q.add_equality("a.owner", "alice");
    q.append_to_base(" JOIN templates t ON t.id = a.template_id");
    assert_eq!(
        q.render().sql,
        "SELECT a.id FROM items a JOIN templates t ON t.id = a.template_id WHERE a.owner = $1"
    );
}

#[test]
fn membership_single_value_degrades_to_equality() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_membership("owner", vec!["alice"]).unwrap();
    q.add_non_membership("kind", vec![7], false).unwrap();
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items WHERE owner = $1 AND kind != $2"
    );
    assert_eq!(q.params(), &[Value::from("alice"), Value::Int(7)]);
}

#[test]
fn membership_small_list_uses_any() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    let values = letters(10);
    q.add_membership("category", values.clone()).unwrap();
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items WHERE category = ANY($1)"
    );
    assert_eq!(q.params(), &[Value::Array(values)]);
}

#[test]
fn membership_large_text_list_unnests() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    let values = letters(11);
    q.add_membership("category", values.clone()).unwrap();

    let rendered = q.render();
    assert!(
        rendered
            .sql
            .contains("EXISTS (SELECT FROM UNNEST($1::TEXT[]) u(c) WHERE u.c = category)")
    );
    assert_eq!(rendered.params, vec![Value::Array(values)]);
}

#[test]
fn membership_large_numeric_list_casts_bigint() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    let ids: Vec<String> = (100..120).map(|n: i64| n.to_string()).collect();
    q.add_membership("id", ids).unwrap();
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items WHERE EXISTS (SELECT FROM UNNEST($1::BIGINT[]) u(c) WHERE u.c = id)"
    );
    assert_eq!(q.param_count(), 1);
}

#[test]
fn non_membership_with_null() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_non_membership("owner", vec!["x", "y"], true).unwrap();
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items WHERE (owner != ALL($1) OR owner IS NULL)"
    );
}

#[test]
fn non_membership_large_list_with_null() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_non_membership("owner", letters(11), true).unwrap();
    assert_eq!(
        q.render().sql,
        "SELECT id FROM items WHERE (NOT EXISTS (SELECT FROM UNNEST($1::TEXT[]) u(c) \
         WHERE u.c = owner) OR owner IS NULL)"
    );
}

#[test]
fn membership_rejects_scalar_input() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    let err = q.add_membership("owner", "alice").unwrap_err();
    assert!(err.is_input_shape());
    assert!(matches!(
        err,
        FilterError::InputShape { ref column, found: "text" } if column == "owner"
    ));
    assert_eq!(q.param_count(), 0);
    assert!(q.conditions().is_empty());
}

#[test]
fn membership_fragment_can_be_grouped() {
    let mut q = QueryBuilder::new("SELECT id FROM sales");
    let a = q
        .membership_fragment("seller", vec!["alice", "bob"], Sense::Include)
        .unwrap();
    let b = q
        .membership_fragment("buyer", vec!["alice", "bob"], Sense::Include)
        .unwrap();
    q.add_raw_condition(format!("{a} OR {b}"));
    assert_eq!(
        q.render().sql,
        "SELECT id FROM sales WHERE (seller = ANY($1) OR buyer = ANY($2))"
    );
}

#[test]
fn render_is_idempotent() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_membership("owner", letters(4)).unwrap();
    q.add_group_columns(&["owner"]);
    q.add_pagination(2, 10);
    assert_eq!(q.render(), q.render());
}

#[test]
fn ordinals_are_contiguous_across_operations() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_equality("contract", "atomicassets");
    q.add_membership("owner", letters(3)).unwrap();
    q.add_non_membership("collection", letters(12), true).unwrap();
    q.add_comparison("minted", ">=", 5);
    q.append_tail("ORDER BY id");
    q.add_pagination(1, 100);

    let rendered = q.render();
    let expected: Vec<usize> = (1..=rendered.params.len()).collect();
    assert_eq!(ordinals(&rendered.sql), expected);
}

#[test]
fn subquery_folds_into_exists_and_shares_params() {
    let mut parent = QueryBuilder::new("SELECT asset.asset_id FROM assets asset");
    parent.add_equality("asset.owner", "alice");
    let before = parent.params().to_vec();

    let mut sub = parent.subquery("SELECT FROM templates t");
    sub.add_join_equality("t", "asset", &["template_id"]);
    sub.add_equality("t.burnable", true);
    let sub_sql = sub.render().sql;
    parent.fold_exists(sub);

    let rendered = parent.render();
    assert_eq!(
        rendered.sql,
        "SELECT asset.asset_id FROM assets asset WHERE asset.owner = $1 AND \
         (EXISTS(SELECT FROM templates t WHERE t.template_id = asset.template_id AND t.burnable = $2))"
    );
    assert!(rendered.sql.contains(&format!("EXISTS({sub_sql})")));
    assert_eq!(rendered.sql.matches("EXISTS(").count(), 1);
    assert!(rendered.params.starts_with(&before));
    assert_eq!(rendered.params.len(), before.len() + 1);

    // Binding after the fold continues after the adopted params.
    assert_eq!(parent.bind(1).ordinal(), 3);
}

#[test]
fn adopt_params_resets_ordinal_counter() {
    let mut q = QueryBuilder::new("SELECT 1");
    q.bind(1);
    q.bind(2);
    q.adopt_params(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
    assert_eq!(q.bind(5).ordinal(), 5);
}

#[test]
fn debug_inlines_literals() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_equality("owner", "o'neil");
    q.add_membership("category", vec!["a", "b"]).unwrap();
    q.add_pagination(1, 10);

    let (sql, params) = q.debug(true);
    assert_eq!(
        sql,
        "SELECT id FROM items WHERE owner = 'o''neil' AND category = ANY(ARRAY['a','b']) \
         LIMIT 10 OFFSET 0"
    );
    assert_eq!(params.len(), 4);

    let (raw, _) = q.debug(false);
    assert_eq!(raw, q.render().sql);
}

#[test]
fn debug_handles_multi_digit_ordinals() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    for i in 0..12 {
        q.add_equality("c", i);
    }
    let (sql, _) = q.debug(true);
    assert!(sql.ends_with("c = 9 AND c = 10 AND c = 11"));
    assert!(!sql.contains('$'));
}

#[test]
fn count_wraps_statement() {
    let mut q = QueryBuilder::new("SELECT id FROM items");
    q.add_equality("owner", "alice");
    let count = q.render().tagged("items.count").into_count();
    assert_eq!(
        count.sql,
        "SELECT COUNT(*) FROM (SELECT id FROM items WHERE owner = $1) x"
    );
    assert_eq!(count.params, vec![Value::from("alice")]);
    assert_eq!(count.tag(), Some("items.count"));
}
