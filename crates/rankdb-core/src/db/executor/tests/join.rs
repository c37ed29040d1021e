use crate::{
    db::{
        executor::{ExecContext, NestLoopIndexExecutor},
        expr::{CmpOp, Expr},
        plan::{CompareOp, IndexScanNode, JoinType, LimitNode, NestLoopIndexNode},
        store::{Database, Table, TempTable, Tuple},
    },
    error::EngineError,
    model::{ColumnModel, IndexModel, TableModel},
    value::{SqlType, Value},
};

// Outer O(x) and inner I(y) with a countable index on y.
fn join_db(outer: &[i32], inner: &[i32]) -> Database {
    let mut db = Database::new();

    let mut outer_table = Table::new(TableModel::new(
        "o",
        vec![ColumnModel::new("x", SqlType::Int)],
    ));
    for &value in outer {
        outer_table
            .insert(Tuple::new(vec![Value::Int(value)]))
            .expect("insert outer");
    }
    db.add_table(outer_table);

    let mut inner_table = Table::new(TableModel::new(
        "i",
        vec![ColumnModel::new("y", SqlType::Int)],
    ));
    inner_table
        .create_index(IndexModel::new("ix_y", vec![0], true))
        .expect("create index");
    for &value in inner {
        inner_table
            .insert(Tuple::new(vec![Value::Int(value)]))
            .expect("insert inner");
    }
    db.add_table(inner_table);

    db
}

// y = x equi-join: the outer value seeds an EQ lookup on the inner index;
// the join tuple is (x, y).
fn equi_join_node(join_type: JoinType) -> NestLoopIndexNode {
    let inner_scan = IndexScanNode::new("i", "ix_y", CompareOp::Eq, vec![Expr::outer_column(0)]);

    NestLoopIndexNode::new(join_type, "o", inner_scan, vec![Expr::column(0)])
}

fn run_join(db: &Database, node: &NestLoopIndexNode) -> Result<Vec<Tuple>, EngineError> {
    let mut sink = TempTable::new(2);
    let mut ctx = ExecContext::new(db);
    NestLoopIndexExecutor::execute(&mut ctx, node, &mut sink)?;

    Ok(sink.rows().to_vec())
}

fn pairs(rows: &[Tuple]) -> Vec<(Value, Value)> {
    rows.iter()
        .map(|row| {
            (
                row.value(0).cloned().expect("outer column"),
                row.value(1).cloned().expect("inner column"),
            )
        })
        .collect()
}

#[test]
fn left_join_pads_unmatched_outers_in_outer_order() {
    // O = {1,2,3}, I = {2,2,4}, y = x, LEFT.
    let db = join_db(&[1, 2, 3], &[2, 2, 4]);
    let node = equi_join_node(JoinType::Left);

    let rows = run_join(&db, &node).expect("join");
    assert_eq!(
        pairs(&rows),
        vec![
            (Value::Int(1), Value::Null),
            (Value::Int(2), Value::Int(2)),
            (Value::Int(2), Value::Int(2)),
            (Value::Int(3), Value::Null),
        ]
    );
}

#[test]
fn full_join_appends_unmatched_inners_null_padded() {
    let db = join_db(&[1, 2, 3], &[2, 2, 4]);
    let node = equi_join_node(JoinType::Full);

    let rows = run_join(&db, &node).expect("join");
    assert_eq!(
        pairs(&rows),
        vec![
            (Value::Int(1), Value::Null),
            (Value::Int(2), Value::Int(2)),
            (Value::Int(2), Value::Int(2)),
            (Value::Int(3), Value::Null),
            (Value::Null, Value::Int(4)),
        ]
    );
}

#[test]
fn inner_join_emits_matched_pairs_only() {
    let db = join_db(&[1, 2, 3], &[2, 2, 4]);
    let node = equi_join_node(JoinType::Inner);

    let rows = run_join(&db, &node).expect("join");
    assert_eq!(
        pairs(&rows),
        vec![
            (Value::Int(2), Value::Int(2)),
            (Value::Int(2), Value::Int(2)),
        ]
    );
}

#[test]
fn full_join_conserves_every_tuple_exactly_once() {
    let db = join_db(&[1, 2, 2, 5], &[2, 3, 3, 7]);
    let node = equi_join_node(JoinType::Full);

    let rows = run_join(&db, &node).expect("join");
    let matched = rows
        .iter()
        .filter(|row| !row.value(0).expect("x").is_null() && !row.value(1).expect("y").is_null())
        .count();
    let outer_padded = rows
        .iter()
        .filter(|row| row.value(1).expect("y").is_null())
        .count();
    let inner_padded = rows
        .iter()
        .filter(|row| row.value(0).expect("x").is_null())
        .count();

    assert_eq!(rows.len(), matched + outer_padded + inner_padded);
    assert_eq!(matched, 2, "each outer 2 matches the single inner 2");
    assert_eq!(outer_padded, 2, "1 and 5 stay unmatched");
    assert_eq!(inner_padded, 3, "3, 3, 7 never match");
}

#[test]
fn failing_prejoin_predicate_skips_the_inner_scan_but_still_pads() {
    let db = join_db(&[1, 2, 3], &[2, 2, 4]);
    let mut node = equi_join_node(JoinType::Left);
    node.prejoin_predicate = Some(Expr::cmp(
        CmpOp::Ne,
        Expr::outer_column(0),
        Expr::literal(Value::Int(2)),
    ));

    let rows = run_join(&db, &node).expect("join");
    assert_eq!(
        pairs(&rows),
        vec![
            (Value::Int(1), Value::Null),
            (Value::Int(2), Value::Null),
            (Value::Int(3), Value::Null),
        ]
    );
}

#[test]
fn null_outer_key_is_no_match_not_an_error() {
    let mut db = Database::new();
    let mut outer_table = Table::new(TableModel::new(
        "o",
        vec![ColumnModel::new("x", SqlType::Int)],
    ));
    outer_table
        .insert(Tuple::new(vec![Value::Null]))
        .expect("insert outer");
    outer_table
        .insert(Tuple::new(vec![Value::Int(2)]))
        .expect("insert outer");
    db.add_table(outer_table);

    let mut inner_table = Table::new(TableModel::new(
        "i",
        vec![ColumnModel::new("y", SqlType::Int)],
    ));
    inner_table
        .create_index(IndexModel::new("ix_y", vec![0], true))
        .expect("create index");
    inner_table
        .insert(Tuple::new(vec![Value::Int(2)]))
        .expect("insert inner");
    db.add_table(inner_table);

    let node = equi_join_node(JoinType::Left);
    let rows = run_join(&db, &node).expect("join");
    assert_eq!(
        pairs(&rows),
        vec![
            (Value::Null, Value::Null),
            (Value::Int(2), Value::Int(2)),
        ],
        "a NULL join key pads instead of matching or failing"
    );
}

#[test]
fn where_predicate_gates_padded_tuples_too() {
    let db = join_db(&[1, 2], &[2]);
    let mut node = equi_join_node(JoinType::Left);
    // Padded tuples carry NULL inner columns: the where predicate is NULL
    // for them and they are dropped.
    node.where_predicate = Some(Expr::cmp(
        CmpOp::Gte,
        Expr::column(0),
        Expr::literal(Value::Int(0)),
    ));

    let rows = run_join(&db, &node).expect("join");
    assert_eq!(pairs(&rows), vec![(Value::Int(2), Value::Int(2))]);
}

#[test]
fn limit_applies_across_matches_and_padding() {
    let db = join_db(&[1, 2, 3], &[2, 2, 4]);
    let mut node = equi_join_node(JoinType::Full);
    node.limit = Some(LimitNode::new(Some(3), 0));

    let rows = run_join(&db, &node).expect("join");
    assert_eq!(
        pairs(&rows),
        vec![
            (Value::Int(1), Value::Null),
            (Value::Int(2), Value::Int(2)),
            (Value::Int(2), Value::Int(2)),
        ]
    );
}

#[test]
fn range_lookup_joins_against_a_window() {
    // y > x with an end expression y <= x + 2.
    let db = join_db(&[1, 4], &[1, 2, 3, 4, 5, 6, 7]);
    let mut inner_scan =
        IndexScanNode::new("i", "ix_y", CompareOp::Gt, vec![Expr::outer_column(0)]);
    inner_scan.end_expr = Some(Expr::cmp(
        CmpOp::Lte,
        Expr::column(0),
        Expr::Arith {
            op: crate::db::expr::ArithOp::Add,
            left: Box::new(Expr::outer_column(0)),
            right: Box::new(Expr::literal(Value::Int(2))),
        },
    ));
    let node = NestLoopIndexNode::new(JoinType::Inner, "o", inner_scan, vec![Expr::column(0)]);

    let rows = run_join(&db, &node).expect("join");
    assert_eq!(
        pairs(&rows),
        vec![
            (Value::Int(1), Value::Int(2)),
            (Value::Int(1), Value::Int(3)),
            (Value::Int(4), Value::Int(5)),
            (Value::Int(4), Value::Int(6)),
        ]
    );
}

#[test]
fn inner_multiset_matches_a_seeded_scan() {
    // For each outer tuple, the inner tuples the join emits equal what a
    // standalone scan seeded with that outer value produces.
    let db = join_db(&[2], &[1, 2, 2, 3]);
    let node = equi_join_node(JoinType::Inner);
    let join_rows = run_join(&db, &node).expect("join");

    let scan_node = IndexScanNode::new(
        "i",
        "ix_y",
        CompareOp::Eq,
        vec![Expr::literal(Value::Int(2))],
    );
    let mut sink = TempTable::new(1);
    let mut ctx = ExecContext::new(&db);
    crate::db::executor::IndexScanExecutor::execute(&mut ctx, &scan_node, &mut sink)
        .expect("scan");

    let join_inner: Vec<_> = join_rows
        .iter()
        .map(|row| row.value(1).cloned().expect("y"))
        .collect();
    let scan_inner: Vec<_> = sink
        .rows()
        .iter()
        .map(|row| row.value(0).cloned().expect("y"))
        .collect();
    assert_eq!(join_inner, scan_inner);
}
