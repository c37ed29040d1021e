mod count;
mod join;

use crate::{
    db::{
        executor::{ExecContext, IndexCountExecutor, IndexScanExecutor},
        plan::{CompareOp, IndexCountNode, IndexScanNode},
        store::{Database, Table, TempTable, Tuple},
    },
    error::EngineError,
    model::{ColumnModel, IndexModel, TableModel},
    value::{SqlType, Value},
};

/// Single INT column table `t(a)` with countable index `ix_a`.
pub(super) fn int_db(values: &[i32]) -> Database {
    let model = TableModel::new("t", vec![ColumnModel::new("a", SqlType::Int)]);
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::new("ix_a", vec![0], true))
        .expect("create index");
    for &value in values {
        table
            .insert(Tuple::new(vec![Value::Int(value)]))
            .expect("insert");
    }

    let mut db = Database::new();
    db.add_table(table);
    db
}

/// TINYINT column table for out-of-range literal scenarios. `None` rows
/// hold NULL.
pub(super) fn tinyint_db(values: &[Option<i8>]) -> Database {
    let model = TableModel::new("t", vec![ColumnModel::new("a", SqlType::TinyInt)]);
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::new("ix_a", vec![0], true))
        .expect("create index");
    for value in values {
        let value = value.map_or(Value::Null, Value::TinyInt);
        table.insert(Tuple::new(vec![value])).expect("insert");
    }

    let mut db = Database::new();
    db.add_table(table);
    db
}

/// VARCHAR(width) column table for truncation scenarios.
pub(super) fn varchar_db(width: usize, values: &[&str]) -> Database {
    let model = TableModel::new(
        "t",
        vec![ColumnModel::with_width("a", SqlType::VarChar, width)],
    );
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::new("ix_a", vec![0], true))
        .expect("create index");
    for &value in values {
        table
            .insert(Tuple::new(vec![Value::Text(value.into())]))
            .expect("insert");
    }

    let mut db = Database::new();
    db.add_table(table);
    db
}

pub(super) fn run_count(db: &Database, node: &IndexCountNode) -> Result<i64, EngineError> {
    let mut sink = TempTable::new(1);
    let mut ctx = ExecContext::new(db);
    IndexCountExecutor::execute(&mut ctx, node, &mut sink)?;

    assert_eq!(sink.row_count(), 1, "count emits exactly one row");
    match sink.rows()[0].value(0) {
        Some(Value::BigInt(count)) => Ok(*count),
        other => panic!("count output must be BIGINT, got {other:?}"),
    }
}

pub(super) fn run_scan(
    db: &Database,
    node: &IndexScanNode,
    sink_arity: usize,
) -> Result<Vec<Tuple>, EngineError> {
    let mut sink = TempTable::new(sink_arity);
    let mut ctx = ExecContext::new(db);
    IndexScanExecutor::execute(&mut ctx, node, &mut sink)?;

    Ok(sink.rows().to_vec())
}

/// First-column values of each emitted row, the common scan assertion.
pub(super) fn first_column(rows: &[Tuple]) -> Vec<Value> {
    rows.iter()
        .map(|row| row.value(0).cloned().expect("column 0"))
        .collect()
}

pub(super) fn count_node(
    lookup_op: CompareOp,
    search_key: Option<Value>,
    end_op: CompareOp,
    end_key: Option<Value>,
) -> IndexCountNode {
    let mut node = IndexCountNode::new("t", "ix_a");
    node.lookup_op = lookup_op;
    node.end_op = end_op;
    if let Some(value) = search_key {
        node.search_key_exprs = vec![crate::db::expr::Expr::literal(value)];
    }
    if let Some(value) = end_key {
        node.end_key_exprs = vec![crate::db::expr::Expr::literal(value)];
    }

    node
}
