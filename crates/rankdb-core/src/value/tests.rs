use crate::value::{
    GeoPoint, GeoRect, SlotCoercion, SqlType, Value, canonical_cmp, coerce_for_slot, max_value_for,
};
use rust_decimal::Decimal;
use std::cmp::Ordering;

#[test]
fn null_ranks_below_every_value() {
    let values = [
        Value::Bool(false),
        Value::TinyInt(i8::MIN),
        Value::BigInt(i64::MIN),
        Value::Decimal(Decimal::MIN),
        Value::Text(String::new()),
        Value::Point(GeoPoint::new(f64::NEG_INFINITY, f64::NEG_INFINITY)),
    ];

    for value in values {
        assert_eq!(
            canonical_cmp(&Value::Null, &value),
            Ordering::Less,
            "NULL must sort before {value:?}"
        );
    }
    assert_eq!(canonical_cmp(&Value::Null, &Value::Null), Ordering::Equal);
}

#[test]
fn numeric_comparison_crosses_widths() {
    assert_eq!(
        canonical_cmp(&Value::TinyInt(2), &Value::BigInt(2)),
        Ordering::Equal
    );
    assert_eq!(
        canonical_cmp(&Value::SmallInt(-1), &Value::Int(0)),
        Ordering::Less
    );
    assert_eq!(
        canonical_cmp(&Value::Decimal(Decimal::new(25, 1)), &Value::Int(2)),
        Ordering::Greater,
        "2.5 must compare above 2 across decimal/int"
    );
}

#[test]
fn integer_narrowing_splits_overflow_and_underflow() {
    let over = coerce_for_slot(&Value::Int(1000), SqlType::TinyInt, None);
    assert_eq!(over, SlotCoercion::Overflow);

    let under = coerce_for_slot(&Value::Int(-1000), SqlType::TinyInt, None);
    assert_eq!(under, SlotCoercion::Underflow);

    let fit = coerce_for_slot(&Value::BigInt(100), SqlType::TinyInt, None);
    assert_eq!(fit, SlotCoercion::Fit(Value::TinyInt(100)));
}

#[test]
fn bigint_literal_overflows_int_slot() {
    // INT <= 6000000000 style predicate literal.
    let outcome = coerce_for_slot(&Value::BigInt(6_000_000_000), SqlType::Int, None);
    assert_eq!(outcome, SlotCoercion::Overflow);
}

#[test]
fn varchar_longer_than_width_truncates_to_prefix() {
    let outcome = coerce_for_slot(&Value::Text("abc".into()), SqlType::VarChar, Some(2));
    assert_eq!(outcome, SlotCoercion::Truncated(Value::Text("ab".into())));

    let exact = coerce_for_slot(&Value::Text("ab".into()), SqlType::VarChar, Some(2));
    assert_eq!(exact, SlotCoercion::Fit(Value::Text("ab".into())));
}

#[test]
fn null_never_enters_a_slot() {
    assert_eq!(
        coerce_for_slot(&Value::Null, SqlType::Int, None),
        SlotCoercion::Null
    );
    assert_eq!(
        coerce_for_slot(&Value::Null, SqlType::VarChar, Some(4)),
        SlotCoercion::Null
    );
}

#[test]
fn family_mismatch_is_incompatible() {
    assert_eq!(
        coerce_for_slot(&Value::Text("1".into()), SqlType::Int, None),
        SlotCoercion::Incompatible
    );
    assert_eq!(
        coerce_for_slot(&Value::Bool(true), SqlType::VarChar, None),
        SlotCoercion::Incompatible
    );
    assert_eq!(
        coerce_for_slot(&Value::Decimal(Decimal::ONE), SqlType::Int, None),
        SlotCoercion::Incompatible
    );
}

#[test]
fn type_maximum_matches_slot_range() {
    assert_eq!(
        max_value_for(SqlType::TinyInt),
        Some(Value::TinyInt(i8::MAX))
    );
    assert_eq!(max_value_for(SqlType::BigInt), Some(Value::BigInt(i64::MAX)));
    assert_eq!(max_value_for(SqlType::VarChar), None);

    // The clamp must coerce cleanly back into its own slot.
    let clamped = max_value_for(SqlType::SmallInt).expect("smallint max");
    assert_eq!(
        coerce_for_slot(&clamped, SqlType::SmallInt, None),
        SlotCoercion::Fit(Value::SmallInt(i16::MAX))
    );
}

#[test]
fn rect_containment_is_inclusive() {
    let rect = GeoRect::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(2.0, 2.0));
    assert!(rect.contains(GeoPoint::new(1.0, 1.0)));
    assert!(rect.contains(GeoPoint::new(0.0, 2.0)), "edges are inside");
    assert!(!rect.contains(GeoPoint::new(2.1, 1.0)));
}
