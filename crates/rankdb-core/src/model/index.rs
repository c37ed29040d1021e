use crate::{
    MAX_INDEX_KEY_COLUMNS,
    model::TableModel,
    value::SqlType,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// IndexKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum IndexKind {
    /// Sorted by canonical key order; supports range positioning and, when
    /// countable, rank queries.
    Ordered,
    /// Covering-cell lookup over a single `Rect` column.
    Spatial,
}

///
/// IndexModel
/// Runtime-only descriptor for an index used by the executors and stores.
/// `columns` are positions into the owning table's column list.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexModel {
    pub name: String,
    pub columns: Vec<usize>,
    pub countable: bool,
    pub kind: IndexKind,
}

impl IndexModel {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<usize>, countable: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            countable,
            kind: IndexKind::Ordered,
        }
    }

    #[must_use]
    pub fn spatial(name: impl Into<String>, column: usize) -> Self {
        Self {
            name: name.into(),
            columns: vec![column],
            countable: false,
            kind: IndexKind::Spatial,
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.columns.len()
    }

    /// Derive the search-key slot schema from the owning table.
    ///
    /// A spatial index stores rect extents but is probed with a point, so
    /// its key schema is the probe type. Returns `None` when a column
    /// position is out of range or the column count exceeds the index
    /// bound; callers treat that as a malformed model, not a runtime range
    /// condition.
    #[must_use]
    pub fn key_schema(&self, table: &TableModel) -> Option<KeySchema> {
        if self.columns.is_empty() || self.columns.len() > MAX_INDEX_KEY_COLUMNS {
            return None;
        }

        if self.kind == IndexKind::Spatial {
            let column = table.columns.get(*self.columns.first()?)?;
            if column.ty != SqlType::Rect || self.columns.len() != 1 {
                return None;
            }
            return Some(KeySchema {
                slots: vec![KeySlot {
                    ty: SqlType::Point,
                    width: None,
                }],
            });
        }

        let mut slots = Vec::with_capacity(self.columns.len());
        for &position in &self.columns {
            let column = table.columns.get(position)?;
            slots.push(KeySlot {
                ty: column.ty,
                width: column.width,
            });
        }

        Some(KeySchema { slots })
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        match self.kind {
            IndexKind::Ordered if self.countable => {
                write!(f, "COUNTABLE {}({columns})", self.name)
            }
            IndexKind::Ordered => write!(f, "{}({columns})", self.name),
            IndexKind::Spatial => write!(f, "SPATIAL {}({columns})", self.name),
        }
    }
}

///
/// KeySlot
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeySlot {
    pub ty: SqlType,
    pub width: Option<usize>,
}

///
/// KeySchema
///
/// Ordered slot layout of an index key. Search-key and end-key scratch
/// tuples conform to this schema; each slot is NULL or a value of the
/// slot's declared type after implicit narrowing.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeySchema {
    slots: Vec<KeySlot>,
}

impl KeySchema {
    #[must_use]
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn slot(&self, position: usize) -> Option<KeySlot> {
        self.slots.get(position).copied()
    }

    #[must_use]
    pub fn slots(&self) -> &[KeySlot] {
        &self.slots
    }
}
