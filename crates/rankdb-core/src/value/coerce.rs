use crate::value::{SqlType, Value};
use rust_decimal::Decimal;

///
/// SlotCoercion
///
/// Outcome of fitting one evaluated value into a typed key slot. This is
/// the sum-type replacement for the thrown out-of-range errors the key
/// assignment path would otherwise need: the range resolver pattern-matches
/// on it instead of catching exceptions.
///
/// `Truncated` carries the narrowed value because truncation is the one
/// boundary that still writes into the slot.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SlotCoercion {
    Fit(Value),
    Null,
    Overflow,
    Underflow,
    Truncated(Value),
    Incompatible,
}

/// Fit `value` into a slot of declared type `ty` with optional declared
/// width (variable-length types only), applying implicit narrowing.
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn coerce_for_slot(value: &Value, ty: SqlType, width: Option<usize>) -> SlotCoercion {
    if value.is_null() {
        return SlotCoercion::Null;
    }

    match ty {
        SqlType::TinyInt => narrow_integer(value, i128::from(i8::MIN), i128::from(i8::MAX), |v| {
            Value::TinyInt(v as i8)
        }),
        SqlType::SmallInt => {
            narrow_integer(value, i128::from(i16::MIN), i128::from(i16::MAX), |v| {
                Value::SmallInt(v as i16)
            })
        }
        SqlType::Int => narrow_integer(value, i128::from(i32::MIN), i128::from(i32::MAX), |v| {
            Value::Int(v as i32)
        }),
        SqlType::BigInt => narrow_integer(value, i128::from(i64::MIN), i128::from(i64::MAX), |v| {
            Value::BigInt(v as i64)
        }),
        SqlType::Decimal => match value {
            Value::Decimal(d) => SlotCoercion::Fit(Value::Decimal(*d)),
            Value::TinyInt(v) => SlotCoercion::Fit(Value::Decimal(Decimal::from(*v))),
            Value::SmallInt(v) => SlotCoercion::Fit(Value::Decimal(Decimal::from(*v))),
            Value::Int(v) => SlotCoercion::Fit(Value::Decimal(Decimal::from(*v))),
            Value::BigInt(v) => SlotCoercion::Fit(Value::Decimal(Decimal::from(*v))),
            _ => SlotCoercion::Incompatible,
        },
        SqlType::VarChar => match value {
            Value::Text(text) => fit_text(text, width),
            _ => SlotCoercion::Incompatible,
        },
        SqlType::Point => match value {
            Value::Point(p) => SlotCoercion::Fit(Value::Point(*p)),
            _ => SlotCoercion::Incompatible,
        },
        SqlType::Rect => match value {
            Value::Rect(r) => SlotCoercion::Fit(Value::Rect(*r)),
            _ => SlotCoercion::Incompatible,
        },
    }
}

/// Maximum representable value of a slot type, used to clamp an
/// overflowing end key so the count path can rank against the type
/// boundary. Variable-length and spatial types have no clamp.
#[must_use]
pub fn max_value_for(ty: SqlType) -> Option<Value> {
    match ty {
        SqlType::TinyInt => Some(Value::TinyInt(i8::MAX)),
        SqlType::SmallInt => Some(Value::SmallInt(i16::MAX)),
        SqlType::Int => Some(Value::Int(i32::MAX)),
        SqlType::BigInt => Some(Value::BigInt(i64::MAX)),
        SqlType::Decimal => Some(Value::Decimal(Decimal::MAX)),
        SqlType::VarChar | SqlType::Point | SqlType::Rect => None,
    }
}

fn narrow_integer(
    value: &Value,
    min: i128,
    max: i128,
    make: impl FnOnce(i128) -> Value,
) -> SlotCoercion {
    let Some(wide) = value.as_i128() else {
        return SlotCoercion::Incompatible;
    };

    if wide > max {
        return SlotCoercion::Overflow;
    }
    if wide < min {
        return SlotCoercion::Underflow;
    }

    SlotCoercion::Fit(make(wide))
}

fn fit_text(text: &str, width: Option<usize>) -> SlotCoercion {
    let Some(width) = width else {
        return SlotCoercion::Fit(Value::Text(text.to_string()));
    };

    if text.chars().count() <= width {
        return SlotCoercion::Fit(Value::Text(text.to_string()));
    }

    let narrowed: String = text.chars().take(width).collect();
    SlotCoercion::Truncated(Value::Text(narrowed))
}
