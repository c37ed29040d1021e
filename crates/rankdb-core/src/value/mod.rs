mod coerce;
mod compare;

#[cfg(test)]
mod tests;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use coerce::{SlotCoercion, coerce_for_slot, max_value_for};
pub use compare::{canonical_cmp, canonical_rank};

///
/// SqlType
///
/// Declared type of a table column or index key slot. `VarChar` width and
/// other per-column limits live on the column model, not the type tag.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SqlType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal,
    VarChar,
    Point,
    Rect,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Decimal => "decimal",
            Self::VarChar => "varchar",
            Self::Point => "point",
            Self::Rect => "rect",
        };
        write!(f, "{label}")
    }
}

///
/// GeoPoint
///
/// Query point for covering-cell lookups.
///

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

///
/// GeoRect
///
/// Axis-aligned spatial extent of a stored geometry. A rect is the
/// "covering cell" of its row: containment of a query point is the
/// index-level match test, refined by any post-predicate.
///

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeoRect {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl GeoRect {
    #[must_use]
    pub const fn new(min: GeoPoint, max: GeoPoint) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

///
/// Value
///
/// Runtime SQL scalar. `Null` is a first-class variant: fresh index keys
/// start all-null and NULL ranks below every non-null value in the
/// canonical order, which is what makes partially-filled search keys behave
/// as "before everything with this prefix".
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Decimal(Decimal),
    Text(String),
    Point(GeoPoint),
    Rect(GeoRect),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Declared type this value conforms to, if it has one.
    /// `Null` and `Bool` are not column-typed.
    #[must_use]
    pub const fn sql_type(&self) -> Option<SqlType> {
        match self {
            Self::Null | Self::Bool(_) => None,
            Self::TinyInt(_) => Some(SqlType::TinyInt),
            Self::SmallInt(_) => Some(SqlType::SmallInt),
            Self::Int(_) => Some(SqlType::Int),
            Self::BigInt(_) => Some(SqlType::BigInt),
            Self::Decimal(_) => Some(SqlType::Decimal),
            Self::Text(_) => Some(SqlType::VarChar),
            Self::Point(_) => Some(SqlType::Point),
            Self::Rect(_) => Some(SqlType::Rect),
        }
    }

    /// Widened integral view for cross-width numeric comparison and
    /// narrowing range checks.
    #[must_use]
    pub const fn as_i128(&self) -> Option<i128> {
        match self {
            Self::TinyInt(v) => Some(*v as i128),
            Self::SmallInt(v) => Some(*v as i128),
            Self::Int(v) => Some(*v as i128),
            Self::BigInt(v) => Some(*v as i128),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::TinyInt(v) => write!(f, "{v}"),
            Self::SmallInt(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Point(p) => write!(f, "point({}, {})", p.x, p.y),
            Self::Rect(r) => {
                write!(
                    f,
                    "rect({}, {}, {}, {})",
                    r.min.x, r.min.y, r.max.x, r.max.y
                )
            }
        }
    }
}
