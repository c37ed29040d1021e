use crate::value::{GeoPoint, GeoRect, Value};
use rust_decimal::Decimal;
use std::cmp::Ordering;

///
/// Canonical Value Rank
///
/// Stable rank used for cross-variant ordering. All numeric variants share
/// one rank so that search keys narrowed by the marshaller compare against
/// index entries of any integer width.
///
/// IMPORTANT:
/// NULL must stay at rank 0. Index keys are initialized all-null and the
/// range resolver relies on "null sorts before every value" for prefix
/// positioning and the skip-null edge cases.
///
#[must_use]
pub const fn canonical_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::TinyInt(_)
        | Value::SmallInt(_)
        | Value::Int(_)
        | Value::BigInt(_)
        | Value::Decimal(_) => 2,
        Value::Text(_) => 3,
        Value::Point(_) => 4,
        Value::Rect(_) => 5,
    }
}

/// Total canonical comparator used by index ordering, rank queries, and
/// predicate comparison.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
///
/// Mixed-rank comparisons are rank-only and must remain deterministic.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = canonical_rank(left).cmp(&canonical_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Point(a), Value::Point(b)) => cmp_point(*a, *b),
        (Value::Rect(a), Value::Rect(b)) => cmp_rect(*a, *b),
        (a, b) => cmp_numeric(a, b),
    }
}

// Cross-width numeric comparison: integers widen through i128, anything
// involving a decimal compares in decimal space.
fn cmp_numeric(left: &Value, right: &Value) -> Ordering {
    match (left.as_i128(), right.as_i128()) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => as_decimal(left).cmp(&as_decimal(right)),
    }
}

fn as_decimal(value: &Value) -> Decimal {
    match value {
        Value::Decimal(d) => *d,
        Value::TinyInt(v) => Decimal::from(*v),
        Value::SmallInt(v) => Decimal::from(*v),
        Value::Int(v) => Decimal::from(*v),
        Value::BigInt(v) => Decimal::from(*v),
        // Only reachable for same-rank (numeric) operands.
        _ => Decimal::ZERO,
    }
}

fn cmp_point(a: GeoPoint, b: GeoPoint) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

fn cmp_rect(a: GeoRect, b: GeoRect) -> Ordering {
    cmp_point(a.min, b.min).then_with(|| cmp_point(a.max, b.max))
}
