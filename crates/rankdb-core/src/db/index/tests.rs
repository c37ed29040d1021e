use crate::{
    db::{
        index::{IndexKey, OrderedIndex},
        store::{Table, Tuple, TupleAddr},
    },
    model::{ColumnModel, IndexModel, TableModel},
    value::{GeoPoint, GeoRect, SqlType, Value},
};

fn int_table(values: &[i32]) -> Table {
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

    table
}

fn key(value: i32) -> IndexKey {
    let mut key = IndexKey::all_null(1);
    key.set_slot(0, Value::Int(value));
    key
}

fn index(table: &Table) -> &OrderedIndex {
    table.index("ix_a").expect("index present")
}

#[test]
fn rank_primitives_split_at_the_key() {
    let table = int_table(&[1, 2, 2, 3, 5]);
    let index = index(&table);

    assert_eq!(index.size(), 5);
    assert_eq!(index.count_le(&key(2), false), 3);
    assert_eq!(index.count_le(&key(2), true), 1);
    assert_eq!(index.count_ge(&key(2), false), 4);
    assert_eq!(index.count_ge(&key(2), true), 2);
    assert!(index.has_key(&key(2)));
    assert!(!index.has_key(&key(4)));
}

#[test]
fn rank_identity_holds_for_every_probe() {
    let table = int_table(&[-3, 0, 0, 7, 7, 7, 11]);
    let index = index(&table);

    for probe in -5..15 {
        let k = key(probe);
        assert_eq!(
            index.count_le(&k, false) + index.count_ge(&k, true),
            index.size(),
            "count_le + strict count_ge must cover the index at {probe}"
        );
        if index.has_key(&k) {
            assert!(
                index.count_le(&k, false) > index.count_le(&k, true),
                "a present key must widen the non-strict rank at {probe}"
            );
        }
    }
}

#[test]
fn null_key_components_sort_first() {
    let model = TableModel::new("t", vec![ColumnModel::new("a", SqlType::Int)]);
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::new("ix_a", vec![0], true))
        .expect("create index");
    table.insert(Tuple::new(vec![Value::Int(5)])).expect("insert");
    table.insert(Tuple::new(vec![Value::Null])).expect("insert");
    table.insert(Tuple::new(vec![Value::Int(1)])).expect("insert");

    let index = table.index("ix_a").expect("index");
    let mut cursor = index.cursor();
    cursor.move_to_end(true);
    let first = cursor.next().expect("first entry");
    assert_eq!(
        table.tuple(first).expect("tuple").value(0),
        Some(&Value::Null),
        "NULL entries must lead the index"
    );
}

#[test]
fn equal_run_enumerates_duplicates_in_insertion_order() {
    let table = int_table(&[2, 1, 2, 3, 2]);
    let index = index(&table);

    let mut cursor = index.cursor();
    cursor.move_to_key(&key(2));
    let run: Vec<TupleAddr> = std::iter::from_fn(|| cursor.next()).collect();
    assert_eq!(run, vec![TupleAddr(0), TupleAddr(2), TupleAddr(4)]);
    assert_eq!(cursor.next(), None, "equal run must stay exhausted");
}

#[test]
fn directional_moves_agree_with_order() {
    let table = int_table(&[1, 2, 3, 4, 5]);
    let index = index(&table);
    let values = |addrs: Vec<TupleAddr>| -> Vec<Value> {
        addrs
            .into_iter()
            .map(|addr| table.tuple(addr).expect("tuple").value(0).cloned().expect("value"))
            .collect()
    };

    let mut cursor = index.cursor();
    assert!(!cursor.move_to_greater(&key(2)));
    let ascending: Vec<TupleAddr> = std::iter::from_fn(|| cursor.next()).collect();
    assert_eq!(
        values(ascending),
        vec![Value::Int(3), Value::Int(4), Value::Int(5)]
    );

    cursor.move_to_less_or_equal(&key(4));
    let descending: Vec<TupleAddr> = std::iter::from_fn(|| cursor.next()).collect();
    assert_eq!(
        values(descending),
        vec![Value::Int(4), Value::Int(3), Value::Int(2), Value::Int(1)]
    );

    assert!(
        cursor.move_to_greater(&key(5)),
        "no entry above the maximum means exhausted"
    );
    assert_eq!(cursor.next(), None);
}

#[test]
fn before_prior_entry_rewinds_two_positions() {
    let table = int_table(&[1, 2, 3, 4, 5]);
    let index = index(&table);
    let value_of = |addr: TupleAddr| table.tuple(addr).expect("tuple").value(0).cloned();

    let mut cursor = index.cursor();
    cursor.move_to_end(true);
    assert_eq!(value_of(cursor.next().expect("1")), Some(Value::Int(1)));
    assert_eq!(value_of(cursor.next().expect("2")), Some(Value::Int(2)));
    assert_eq!(value_of(cursor.next().expect("3")), Some(Value::Int(3)));

    cursor.move_to_before_prior_entry();
    assert_eq!(
        value_of(cursor.next().expect("rewound")),
        Some(Value::Int(2)),
        "next must return what was returned two calls ago"
    );
    assert_eq!(
        value_of(cursor.next().expect("reverse continues")),
        Some(Value::Int(1)),
        "traversal continues descending after the rewind"
    );
    assert_eq!(cursor.next(), None);
}

#[test]
fn covering_cell_yields_containing_extents_then_none() {
    let model = TableModel::new("shapes", vec![ColumnModel::new("g", SqlType::Rect)]);
    let mut table = Table::new(model);
    table
        .create_index(IndexModel::spatial("ix_g", 0))
        .expect("create index");

    let hit = GeoRect::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(4.0, 4.0));
    let miss = GeoRect::new(GeoPoint::new(10.0, 10.0), GeoPoint::new(12.0, 12.0));
    table.insert(Tuple::new(vec![Value::Rect(hit)])).expect("insert");
    table.insert(Tuple::new(vec![Value::Rect(miss)])).expect("insert");
    table.insert(Tuple::new(vec![Value::Null])).expect("insert");

    let index = table.index("ix_g").expect("index");
    let mut probe = IndexKey::all_null(1);
    probe.set_slot(0, Value::Point(GeoPoint::new(1.0, 1.0)));

    let mut cursor = index.cursor();
    cursor.move_to_covering_cell(&probe);
    assert_eq!(cursor.next(), Some(TupleAddr(0)));
    assert_eq!(cursor.next(), None, "null and non-covering extents excluded");
}
