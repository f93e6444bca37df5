use super::*;
use crate::{
    criteria::{Clause, CriteriaError, CriteriaTree, Wrapper},
    model::{MetaError, OrderDirection},
    sql::ops,
    test_fixtures::{
        Customer, EventLog, GuardedAccount, GuardedLedger, RegionSale, SoftOrder, StampedNote,
    },
    value::Value,
};
use proptest::prelude::*;

fn customer() -> Customer {
    Customer {
        id: 7,
        name: "ice".to_string(),
        age: Some(30),
        email: Some("x@y.z".to_string()),
        created_at: Some(1000),
        scratch: None,
    }
}

fn sparse_customer() -> Customer {
    Customer {
        id: 7,
        name: "ice".to_string(),
        age: None,
        email: None,
        created_at: None,
        scratch: None,
    }
}

// ----------------------------------------------------------------------
// Inserts
// ----------------------------------------------------------------------

#[test]
fn insert_binds_every_insertable_column() {
    let stmt = ops::insert(&sparse_customer()).unwrap();

    assert_eq!(
        stmt.sql,
        "INSERT INTO customer (id, name, age, email_addr, created_at) VALUES (?, ?, ?, ?, ?)"
    );
    assert_eq!(
        stmt.params,
        vec![
            Value::Uint(7),
            Value::Text("ice".to_string()),
            Value::Null,
            Value::Null,
            Value::Null,
        ]
    );
}

#[test]
fn insert_selective_skips_absent_fields() {
    let stmt = ops::insert_selective(&sparse_customer()).unwrap();

    assert_eq!(stmt.sql, "INSERT INTO customer (id, name) VALUES (?, ?)");
    assert_eq!(
        stmt.params,
        vec![Value::Uint(7), Value::Text("ice".to_string())]
    );
}

// ----------------------------------------------------------------------
// Updates
// ----------------------------------------------------------------------

#[test]
fn update_by_key_sets_updatable_non_id_columns() {
    let stmt = ops::update_by_key(&customer(), &[Value::Uint(7)]).unwrap();

    assert_eq!(
        stmt.sql,
        "UPDATE customer SET name = ?, age = ?, email_addr = ? WHERE id = ?"
    );
    assert_eq!(stmt.params.len(), 4);
    assert_eq!(stmt.params[3], Value::Uint(7));
}

#[test]
fn update_by_key_selective_skips_absent_fields() {
    let stmt = ops::update_by_key_selective(&sparse_customer(), &[Value::Uint(7)]).unwrap();

    assert_eq!(stmt.sql, "UPDATE customer SET name = ? WHERE id = ?");
    assert_eq!(
        stmt.params,
        vec![Value::Text("ice".to_string()), Value::Uint(7)]
    );
}

#[test]
fn assignments_take_precedence_over_the_record_set() {
    let tree = Wrapper::<Customer>::new()
        .set("name", "renamed")
        .set_raw("age = age + 1")
        .eq("id", 7u64)
        .build();
    let stmt = ops::update::<Customer>(&tree).unwrap();

    assert_eq!(
        stmt.sql,
        "UPDATE customer SET name = ?, age = age + 1 WHERE (id = ?)"
    );
    assert_eq!(
        stmt.params,
        vec![Value::Text("renamed".to_string()), Value::Uint(7)]
    );
}

#[test]
fn first_present_pair_per_column_wins() {
    let tree = Wrapper::<Customer>::new()
        .set("name", "first")
        .set("name", "second")
        .eq("id", 7u64)
        .build();
    let stmt = ops::update::<Customer>(&tree).unwrap();

    assert_eq!(stmt.sql, "UPDATE customer SET name = ? WHERE (id = ?)");
    assert_eq!(stmt.params[0], Value::Text("first".to_string()));
}

#[test]
fn later_present_pair_overrides_an_earlier_null() {
    let none: Option<&str> = None;

    // A null pair only stands when no later pair for the column is
    // present, with or without the nullable-update opt-in.
    let tree = Wrapper::<Customer>::new()
        .set("email", none)
        .set("email", "x@y.z")
        .eq("id", 7u64)
        .build();
    let stmt = ops::update::<Customer>(&tree).unwrap();
    assert_eq!(stmt.sql, "UPDATE customer SET email_addr = ? WHERE (id = ?)");
    assert_eq!(stmt.params[0], Value::Text("x@y.z".to_string()));

    let tree = Wrapper::<Customer>::new()
        .allow_nullable_update(true)
        .set("email", none)
        .set("email", "x@y.z")
        .eq("id", 7u64)
        .build();
    let stmt = ops::update::<Customer>(&tree).unwrap();
    assert_eq!(stmt.params[0], Value::Text("x@y.z".to_string()));
}

#[test]
fn all_null_pairs_for_a_column_keep_the_null_semantics() {
    let none: Option<&str> = None;

    let tree = Wrapper::<Customer>::new()
        .set("email", none)
        .set("email", none)
        .eq("id", 7u64)
        .build();
    let err = ops::update::<Customer>(&tree).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Criteria(CriteriaError::NullValue { .. })
    ));

    let tree = Wrapper::<Customer>::new()
        .allow_nullable_update(true)
        .set("email", none)
        .set("email", none)
        .eq("id", 7u64)
        .build();
    let stmt = ops::update::<Customer>(&tree).unwrap();
    assert_eq!(stmt.params[0], Value::Null);
}

#[test]
fn null_set_value_is_refused_unless_opted_in() {
    let none: Option<&str> = None;

    let tree = Wrapper::<Customer>::new()
        .set("email", none)
        .eq("id", 7u64)
        .build();
    let err = ops::update::<Customer>(&tree).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Criteria(CriteriaError::NullValue { operator, .. }) if operator == "SET"
    ));

    let tree = Wrapper::<Customer>::new()
        .allow_nullable_update(true)
        .set("email", none)
        .eq("id", 7u64)
        .build();
    let stmt = ops::update::<Customer>(&tree).unwrap();
    assert_eq!(stmt.sql, "UPDATE customer SET email_addr = ? WHERE (id = ?)");
    assert_eq!(stmt.params[0], Value::Null);
}

#[test]
fn assignment_free_update_without_record_is_an_error() {
    let tree = Wrapper::<Customer>::new().eq("id", 7u64).build();
    let err = ops::update::<Customer>(&tree).unwrap_err();

    assert!(matches!(err, TemplateError::MissingRecord { .. }));
}

// ----------------------------------------------------------------------
// Criteria WHERE shapes
// ----------------------------------------------------------------------

#[test]
fn select_by_criteria_renders_group_parens() {
    let tree = Wrapper::<Customer>::new().eq("name", "ice").build();
    let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT id, name, age, email_addr, created_at FROM customer WHERE (name = ?)"
    );
}

#[test]
fn or_groups_are_or_joined() {
    let tree = Wrapper::<Customer>::new()
        .eq("name", "a")
        .or()
        .eq("age", 3i64)
        .build();
    let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

    assert!(stmt.sql.ends_with("WHERE (name = ?) OR (age = ?)"));
}

#[test]
fn empty_tree_renders_no_where_clause() {
    let stmt = ops::select_by_criteria::<Customer>(&CriteriaTree::unconditioned()).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT id, name, age, email_addr, created_at FROM customer"
    );
    assert!(stmt.params.is_empty());
}

#[test]
fn in_list_emits_one_placeholder_per_element_in_input_order() {
    let tree = Wrapper::<Customer>::new()
        .in_list("age", [3i64, 1, 2])
        .build();
    let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

    assert!(stmt.sql.ends_with("WHERE (age IN (?, ?, ?))"));
    assert_eq!(
        stmt.params,
        vec![Value::Int(3), Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn nested_or_renders_as_one_parenthesized_criterion() {
    let tree = Wrapper::<Customer>::new()
        .eq("name", "a")
        .nested_or([
            Clause::<Customer>::new().eq("age", 1i64).gt("id", 0u64),
            Clause::<Customer>::new().eq("age", 2i64),
        ])
        .build();
    let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

    assert!(
        stmt.sql
            .ends_with("WHERE (name = ? AND ((age = ? AND id > ?) OR (age = ?)))")
    );
    assert_eq!(stmt.params.len(), 4);
}

#[test]
fn latched_builder_fault_surfaces_at_assembly() {
    let tree = Wrapper::<Customer>::new().eq("no_such_field", 1i64).build();
    let err = ops::select_by_criteria::<Customer>(&tree).unwrap_err();

    assert!(matches!(
        err,
        TemplateError::Criteria(CriteriaError::Resolve(_))
    ));
}

// ----------------------------------------------------------------------
// Projection, ordering, raw SQL
// ----------------------------------------------------------------------

#[test]
fn select_override_and_distinct() {
    let tree = Wrapper::<Customer>::new()
        .select("id, name")
        .distinct(true)
        .eq("name", "ice")
        .build();
    let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT DISTINCT id, name FROM customer WHERE (name = ?)"
    );
}

#[test]
fn runtime_order_by_uses_physical_names() {
    let tree = Wrapper::<Customer>::new()
        .eq("name", "ice")
        .order_by("email", OrderDirection::Asc)
        .order_by("age", OrderDirection::Desc)
        .build();
    let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

    assert!(stmt.sql.ends_with("ORDER BY email_addr ASC, age DESC"));
}

#[test]
fn metadata_grouping_sits_between_where_and_order() {
    let tree = Wrapper::<RegionSale>::new()
        .eq("region", "west")
        .order_by("total", OrderDirection::Desc)
        .build();
    let stmt = ops::select_by_criteria::<RegionSale>(&tree).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT region, total FROM region_sale WHERE (region = ?) \
         GROUP BY region HAVING SUM(total) > 0 ORDER BY total DESC"
    );
}

#[test]
fn counts_skip_the_metadata_grouping() {
    let tree = Wrapper::<RegionSale>::new().eq("region", "west").build();
    let stmt = ops::count_by_criteria::<RegionSale>(&tree).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT COUNT(*) FROM region_sale WHERE (region = ?)"
    );
}

#[test]
fn prefix_and_suffix_wrap_the_statement() {
    let tree = Wrapper::<Customer>::new()
        .prefix_sql("/* hint */")
        .eq("name", "ice")
        .suffix_sql("LIMIT 10")
        .build();
    let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

    assert!(stmt.sql.starts_with("/* hint */ SELECT "));
    assert!(stmt.sql.ends_with("WHERE (name = ?) LIMIT 10"));
}

// ----------------------------------------------------------------------
// Key-addressed operations
// ----------------------------------------------------------------------

#[test]
fn select_by_key_binds_the_id() {
    let stmt = ops::select_by_key::<Customer>(&[Value::Uint(7)]).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT id, name, age, email_addr, created_at FROM customer WHERE id = ?"
    );
    assert_eq!(stmt.params, vec![Value::Uint(7)]);
}

#[test]
fn id_less_table_fails_at_the_first_key_addressed_call() {
    // Non-key operations stay available.
    let log = EventLog {
        seq: 1,
        message: "boot".to_string(),
    };
    assert!(ops::insert(&log).is_ok());

    let err = ops::select_by_key::<EventLog>(&[Value::Uint(1)]).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Meta(MetaError::NoIdColumn { table }) if table == "event_log"
    ));
}

#[test]
fn key_arity_is_checked_against_the_id_columns() {
    let err = ops::select_by_key::<Customer>(&[Value::Uint(1), Value::Uint(2)]).unwrap_err();

    assert!(matches!(
        err,
        TemplateError::KeyArity {
            expected: 1,
            found: 2,
            ..
        }
    ));
}

// ----------------------------------------------------------------------
// Entity-driven WHERE
// ----------------------------------------------------------------------

#[test]
fn select_by_entity_matches_present_non_id_fields() {
    let stmt = ops::select_by_entity(&sparse_customer()).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT id, name, age, email_addr, created_at FROM customer WHERE name = ?"
    );
    assert_eq!(stmt.params, vec![Value::Text("ice".to_string())]);
}

#[test]
fn delete_by_entity_joins_present_fields_with_and() {
    let stmt = ops::delete_by_entity(&customer()).unwrap();

    assert_eq!(
        stmt.sql,
        "DELETE FROM customer WHERE name = ? AND age = ? AND email_addr = ? AND created_at = ?"
    );
    assert_eq!(stmt.params.len(), 4);
}

#[test]
fn count_by_entity_shares_the_entity_where_shape() {
    let stmt = ops::count_by_entity(&sparse_customer()).unwrap();

    assert_eq!(stmt.sql, "SELECT COUNT(*) FROM customer WHERE name = ?");
    assert_eq!(stmt.params, vec![Value::Text("ice".to_string())]);
}

#[test]
fn entity_where_on_a_soft_table_leaves_the_flag_to_the_overlay() {
    let order = SoftOrder {
        id: 1,
        name: "ice".to_string(),
        status: 5,
    };
    let stmt = ops::select_by_entity(&order).unwrap();

    // status is the deletion flag, so its record value never becomes a
    // predicate of its own.
    assert_eq!(
        stmt.sql,
        "SELECT id, name, status FROM soft_order WHERE name = ? AND status != 0"
    );
    assert_eq!(stmt.params, vec![Value::Text("ice".to_string())]);
}

#[test]
fn delete_by_entity_on_a_soft_table_rewrites_to_a_flag_update() {
    let order = SoftOrder {
        id: 1,
        name: "ice".to_string(),
        status: 5,
    };
    let stmt = ops::delete_by_entity(&order).unwrap();

    assert_eq!(
        stmt.sql,
        "UPDATE soft_order SET status = 0 WHERE name = ? AND status != 0"
    );
}

#[test]
fn blank_entity_selects_everything_but_cannot_bulk_delete_when_guarded() {
    let blank = GuardedLedger { id: 3, note: None };

    let stmt = ops::select_by_entity(&blank).unwrap();
    assert_eq!(stmt.sql, "SELECT id, note FROM guarded_ledger");
    assert!(stmt.params.is_empty());

    let err = ops::delete_by_entity(&blank).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::Criteria(CriteriaError::EmptyCriteriaForbidden { table, .. })
            if table == "guarded_ledger"
    ));
}

// ----------------------------------------------------------------------
// Soft delete
// ----------------------------------------------------------------------

#[test]
fn soft_table_reads_filter_deleted_rows() {
    let tree = Wrapper::<SoftOrder>::new().eq("name", "ice").build();
    let stmt = ops::select_by_criteria::<SoftOrder>(&tree).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT id, name, status FROM soft_order WHERE (name = ?) AND status != 0"
    );
}

#[test]
fn soft_table_or_list_cannot_escape_the_filter() {
    let tree = Wrapper::<SoftOrder>::new()
        .eq("name", "a")
        .or()
        .eq("name", "b")
        .build();
    let stmt = ops::select_by_criteria::<SoftOrder>(&tree).unwrap();

    assert!(
        stmt.sql
            .ends_with("WHERE ((name = ?) OR (name = ?)) AND status != 0")
    );
}

#[test]
fn soft_delete_by_key_rewrites_to_a_flag_update() {
    let stmt = ops::delete_by_key::<SoftOrder>(&[Value::Uint(1)]).unwrap();

    assert_eq!(
        stmt.sql,
        "UPDATE soft_order SET status = 0 WHERE id = ? AND status != 0"
    );
    assert_eq!(stmt.params, vec![Value::Uint(1)]);
}

#[test]
fn timestamp_mode_stamps_and_filters_on_null() {
    let tree = Wrapper::<StampedNote>::new().eq("title", "x").build();
    let stmt = ops::delete_by_criteria::<StampedNote>(&tree).unwrap();

    assert_eq!(
        stmt.sql,
        "UPDATE stamped_note SET deleted_at = CURRENT_TIMESTAMP \
         WHERE (title = ?) AND deleted_at IS NULL"
    );
}

#[test]
fn plain_table_deletes_physically() {
    let stmt = ops::delete_by_key::<Customer>(&[Value::Uint(1)]).unwrap();

    assert_eq!(stmt.sql, "DELETE FROM customer WHERE id = ?");
}

#[test]
fn count_on_a_soft_table_still_filters() {
    let stmt =
        ops::count_by_criteria::<SoftOrder>(&CriteriaTree::unconditioned()).unwrap();

    assert_eq!(stmt.sql, "SELECT COUNT(*) FROM soft_order WHERE status != 0");
}

// ----------------------------------------------------------------------
// Empty-criteria guard
// ----------------------------------------------------------------------

#[test]
fn permissive_table_allows_unconditioned_mutations() {
    let stmt = ops::delete_by_criteria::<Customer>(&CriteriaTree::unconditioned()).unwrap();

    assert_eq!(stmt.sql, "DELETE FROM customer");
}

#[test]
fn guarded_table_refuses_unconditioned_mutations() {
    let err =
        ops::delete_by_criteria::<GuardedAccount>(&CriteriaTree::unconditioned()).unwrap_err();

    assert!(matches!(
        err,
        TemplateError::Criteria(CriteriaError::EmptyCriteriaForbidden { table, .. })
            if table == "guarded_account"
    ));
}

#[test]
fn guarded_table_still_selects_unconditioned() {
    let stmt =
        ops::select_by_criteria::<GuardedAccount>(&CriteriaTree::unconditioned()).unwrap();

    assert_eq!(stmt.sql, "SELECT id, balance FROM guarded_account");
}

// ----------------------------------------------------------------------
// Template cache
// ----------------------------------------------------------------------

#[test]
fn cached_template_is_shared_across_calls() {
    cache::with_cache_enabled(|| {
        let first = ops::template_for::<Customer>(OperationKind::SelectByCriteria).unwrap();
        let second = ops::template_for::<Customer>(OperationKind::SelectByCriteria).unwrap();

        assert!(std::sync::Arc::ptr_eq(&first, &second));
    });
}

#[test]
fn repeat_builds_hit_and_invalid_builds_never_populate() {
    cache::with_cache_enabled(|| {
        let before = cache::stats();
        let _ = ops::template_for::<Customer>(OperationKind::Insert).unwrap();
        let _ = ops::template_for::<Customer>(OperationKind::Insert).unwrap();

        let after = cache::stats();
        assert!(after.hits > before.hits);
        assert!(after.size >= 1);

        // A failed build leaves no entry behind.
        assert!(ops::template_for::<EventLog>(OperationKind::SelectByKey).is_err());
        let key = cache::TemplateKey::new("fixtures::EventLog", OperationKind::SelectByKey);
        assert!(cache::get(&key).is_none());
    });
}

#[test]
fn concurrent_assembly_converges_on_one_statement_shape() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                cache::with_cache_enabled(|| {
                    let tree = Wrapper::<Customer>::new().eq("name", "ice").build();
                    ops::select_by_criteria::<Customer>(&tree).unwrap().sql
                })
            })
        })
        .collect();

    let mut shapes: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    shapes.sort();
    shapes.dedup();

    assert_eq!(shapes.len(), 1);
    assert!(shapes[0].ends_with("WHERE (name = ?)"));
}

#[test]
fn distinct_operations_cache_distinct_templates() {
    cache::with_cache_enabled(|| {
        let select = ops::template_for::<Customer>(OperationKind::SelectByCriteria).unwrap();
        let count = ops::template_for::<Customer>(OperationKind::CountByCriteria).unwrap();

        assert!(!std::sync::Arc::ptr_eq(&select, &count));
        assert_eq!(count.op, OperationKind::CountByCriteria);
    });
}

// ----------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------

proptest! {
    #[test]
    fn in_list_placeholder_count_matches_element_count(values in prop::collection::vec(any::<i64>(), 1..40)) {
        let expected = values.len();
        let tree = Wrapper::<Customer>::new().in_list("age", values).build();
        let stmt = ops::select_by_criteria::<Customer>(&tree).unwrap();

        prop_assert_eq!(stmt.sql.matches('?').count(), expected);
        prop_assert_eq!(stmt.params.len(), expected);
    }

    #[test]
    fn where_parentheses_stay_balanced(names in prop::collection::vec("[a-z]{1,8}", 1..6)) {
        let mut builder = Wrapper::<SoftOrder>::new();
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                builder = builder.or();
            }
            builder = builder.eq("name", name.as_str());
        }
        let stmt = ops::select_by_criteria::<SoftOrder>(&builder.build()).unwrap();

        let open = stmt.sql.matches('(').count();
        let close = stmt.sql.matches(')').count();
        prop_assert_eq!(open, close);
        prop_assert_eq!(stmt.params.len(), names.len());
    }
}
