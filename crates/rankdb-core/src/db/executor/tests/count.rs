use crate::{
    db::{
        executor::tests::{count_node, int_db, run_count, tinyint_db},
        expr::Expr,
        plan::{CompareOp, IndexCountNode},
        store::{Table, Tuple},
    },
    error::ErrorClass,
    model::{ColumnModel, IndexModel, TableModel},
    value::{SqlType, Value},
};

#[test]
fn inclusive_range_counts_both_endpoints() {
    // T(a) = {1,2,3,4,5}, count GTE 2 LTE 4.
    let db = int_db(&[1, 2, 3, 4, 5]);
    let node = count_node(
        CompareOp::Gte,
        Some(Value::Int(2)),
        CompareOp::Lte,
        Some(Value::Int(4)),
    );

    assert_eq!(run_count(&db, &node).expect("count"), 3);
}

#[test]
fn exclusive_range_counts_the_interior() {
    let db = int_db(&[1, 2, 3, 4, 5]);
    let node = count_node(
        CompareOp::Gt,
        Some(Value::Int(2)),
        CompareOp::Lt,
        Some(Value::Int(4)),
    );

    assert_eq!(run_count(&db, &node).expect("count"), 1);
}

#[test]
fn out_of_range_bounds_widen_to_the_full_table() {
    // TINYINT column; GTE -1000 underflows, LT 1000 overflows and clamps.
    let db = tinyint_db(&[Some(1), Some(2), Some(3), Some(4), Some(5)]);
    let mut node = count_node(
        CompareOp::Gte,
        Some(Value::Int(-1000)),
        CompareOp::Lt,
        Some(Value::Int(1000)),
    );
    node.skip_null_expr = Some(Expr::is_null(Expr::column(0)));

    assert_eq!(run_count(&db, &node).expect("count"), 5);
}

#[test]
fn underflow_start_does_not_count_the_leading_null_run() {
    let db = tinyint_db(&[None, None, Some(1), Some(2)]);
    let mut node = count_node(CompareOp::Gte, Some(Value::Int(-1000)), CompareOp::Invalid, None);
    node.skip_null_expr = Some(Expr::is_null(Expr::column(0)));

    assert_eq!(run_count(&db, &node).expect("count"), 2);
}

#[test]
fn reverse_edge_excludes_nulls_under_an_upper_bound() {
    // No lower bound, a < 2, with NULLs leading the index.
    let db = tinyint_db(&[None, Some(1), Some(2), Some(3)]);
    let mut node = count_node(CompareOp::Invalid, None, CompareOp::Lt, Some(Value::Int(2)));
    node.skip_null_expr = Some(Expr::is_null(Expr::column(0)));

    assert_eq!(run_count(&db, &node).expect("count"), 1);
}

#[test]
fn equality_counts_every_duplicate() {
    let db = int_db(&[1, 2, 2, 3]);
    let node = count_node(
        CompareOp::Eq,
        Some(Value::Int(2)),
        CompareOp::Lte,
        Some(Value::Int(2)),
    );

    assert_eq!(run_count(&db, &node).expect("count"), 2);
}

#[test]
fn duplicates_count_once_per_entry_at_the_boundary() {
    let db = int_db(&[1, 2, 2, 3]);
    let node = count_node(CompareOp::Gte, Some(Value::Int(2)), CompareOp::Invalid, None);

    assert_eq!(run_count(&db, &node).expect("count"), 3);
}

#[test]
fn null_search_key_counts_zero() {
    let db = int_db(&[1, 2, 3]);
    let node = count_node(CompareOp::Gte, Some(Value::Null), CompareOp::Invalid, None);

    assert_eq!(run_count(&db, &node).expect("count"), 0);
}

#[test]
fn eq_and_gt_overflow_count_zero() {
    let db = tinyint_db(&[Some(1), Some(2), Some(3)]);

    for op in [CompareOp::Eq, CompareOp::Gt, CompareOp::Gte] {
        let mut node = count_node(op, Some(Value::Int(1000)), CompareOp::Invalid, None);
        if op == CompareOp::Eq {
            // EQ requires matching end keys.
            node.end_op = CompareOp::Lte;
            node.end_key_exprs = vec![Expr::literal(Value::Int(1000))];
        }
        assert_eq!(run_count(&db, &node).expect("count"), 0, "op {op}");
    }
}

#[test]
fn upper_bound_below_the_minimum_counts_zero() {
    let db = int_db(&[1, 2, 3]);
    let mut node = count_node(CompareOp::Invalid, None, CompareOp::Lte, Some(Value::Int(0)));
    node.skip_null_expr = Some(Expr::is_null(Expr::column(0)));

    assert_eq!(run_count(&db, &node).expect("count"), 0);
}

#[test]
fn unbounded_count_is_the_index_size() {
    let db = int_db(&[5, 1, 3, 2, 4]);
    let node = count_node(CompareOp::Invalid, None, CompareOp::Invalid, None);

    assert_eq!(run_count(&db, &node).expect("count"), 5);
}

#[test]
fn empty_index_counts_zero_for_any_range() {
    let db = int_db(&[]);
    let node = count_node(
        CompareOp::Gte,
        Some(Value::Int(2)),
        CompareOp::Lte,
        Some(Value::Int(4)),
    );

    assert_eq!(run_count(&db, &node).expect("count"), 0);
}

#[test]
fn pending_delete_entries_stay_in_the_rank_arithmetic() {
    let model = TableModel::new("t", vec![ColumnModel::new("a", SqlType::Int)]);
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::new("ix_a", vec![0], true))
        .expect("create index");
    for value in [1, 2, 3] {
        let addr = table
            .insert(Tuple::new(vec![Value::Int(value)]))
            .expect("insert");
        if value == 2 {
            table.mark_pending_delete(addr);
        }
    }
    let mut db = crate::db::store::Database::new();
    db.add_table(table);

    let node = count_node(CompareOp::Gte, Some(Value::Int(1)), CompareOp::Invalid, None);
    assert_eq!(
        run_count(&db, &node).expect("count"),
        3,
        "the count path ranks index entries and never consults tuple flags"
    );
}

#[test]
fn non_countable_index_is_rejected() {
    let model = TableModel::new("t", vec![ColumnModel::new("a", SqlType::Int)]);
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::new("ix_a", vec![0], false))
        .expect("create index");
    let mut db = crate::db::store::Database::new();
    db.add_table(table);

    let node = count_node(CompareOp::Gte, Some(Value::Int(1)), CompareOp::Invalid, None);
    let err = run_count(&db, &node).expect_err("non-countable");
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn missing_index_is_fatal_with_the_plan_attached() {
    let db = int_db(&[1]);
    let mut node = IndexCountNode::new("t", "ix_missing");
    node.lookup_op = CompareOp::Gte;
    node.search_key_exprs = vec![Expr::literal(Value::Int(1))];

    let err = run_count(&db, &node).expect_err("missing index");
    assert_eq!(err.class, ErrorClass::NotFound);
    assert!(
        err.message.contains("IndexCount["),
        "fatal errors carry the plan debug form: {}",
        err.message
    );
}

#[test]
fn eq_with_partial_key_is_an_unsupported_lookup() {
    // Two-column index, one search key, no matching end keys.
    let model = TableModel::new(
        "t",
        vec![
            ColumnModel::new("a", SqlType::Int),
            ColumnModel::new("b", SqlType::Int),
        ],
    );
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::new("ix_a", vec![0, 1], true))
        .expect("create index");
    let mut db = crate::db::store::Database::new();
    db.add_table(table);

    let node = count_node(CompareOp::Eq, Some(Value::Int(1)), CompareOp::Invalid, None);
    let err = run_count(&db, &node).expect_err("partial eq");
    assert_eq!(err.class, ErrorClass::Unsupported);
}
