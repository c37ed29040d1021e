//! Module: index
//! Responsibility: the sorted, countable index structure, its keys, and the
//! stateful traversal cursor.
//! Does not own: key marshalling from plan expressions or range promotion.
//! Boundary: consumed by the operator executors.

mod cursor;
mod key;

#[cfg(test)]
mod tests;

pub use cursor::IndexCursor;
pub use key::IndexKey;

use crate::{
    db::store::{Tuple, TupleAddr},
    error::{EngineError, ErrorClass, ErrorOrigin},
    model::{IndexKind, IndexModel, KeySchema},
    value::{GeoRect, SlotCoercion, Value, coerce_for_slot},
};
use std::cmp::Ordering;

///
/// IndexEntry
///
/// One indexed row: its key, its tuple address, and the insertion sequence
/// that makes equal-key enumeration stable. Spatial entries carry the
/// stored geometry's extent instead of an orderable key.
///

#[derive(Clone, Debug)]
pub(crate) struct IndexEntry {
    pub(crate) key: IndexKey,
    pub(crate) addr: TupleAddr,
    pub(crate) seq: u64,
    pub(crate) extent: Option<GeoRect>,
}

///
/// OrderedIndex
///
/// Sorted index over one table. Entries are ordered by canonical key
/// order, then insertion sequence, so EQ lookups enumerate duplicates in
/// stable insertion order. When the model is countable, the rank
/// primitives answer `count_le` / `count_ge` in O(log n).
///

#[derive(Debug)]
pub struct OrderedIndex {
    model: IndexModel,
    schema: KeySchema,
    entries: Vec<IndexEntry>,
}

impl OrderedIndex {
    #[must_use]
    pub(crate) fn new(model: IndexModel, schema: KeySchema) -> Self {
        Self {
            model,
            schema,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.model.name
    }

    #[must_use]
    pub const fn model(&self) -> &IndexModel {
        &self.model
    }

    #[must_use]
    pub const fn key_schema(&self) -> &KeySchema {
        &self.schema
    }

    #[must_use]
    pub const fn is_countable(&self) -> bool {
        self.model.countable
    }

    #[must_use]
    pub fn cursor(&self) -> IndexCursor<'_> {
        IndexCursor::new(self)
    }

    /// Index one stored tuple. Table columns already conform to their
    /// declared types, so any narrowing outcome here is a model/table
    /// mismatch, not a runtime range condition.
    pub(crate) fn insert_tuple(
        &mut self,
        tuple: &Tuple,
        addr: TupleAddr,
        seq: u64,
    ) -> Result<(), EngineError> {
        match self.model.kind {
            IndexKind::Ordered => self.insert_ordered(tuple, addr, seq),
            IndexKind::Spatial => self.insert_spatial(tuple, addr, seq),
        }
    }

    fn insert_ordered(
        &mut self,
        tuple: &Tuple,
        addr: TupleAddr,
        seq: u64,
    ) -> Result<(), EngineError> {
        let mut key = IndexKey::all_null(self.model.arity());
        for (position, &column) in self.model.columns.iter().enumerate() {
            let value = tuple.value(column).unwrap_or(&Value::Null);
            let Some(slot) = self.schema.slot(position) else {
                return Err(self.corrupt_entry("key slot missing for index column"));
            };

            match coerce_for_slot(value, slot.ty, slot.width) {
                SlotCoercion::Fit(value) => key.set_slot(position, value),
                // NULL column values are indexed; they sort first.
                SlotCoercion::Null => {}
                SlotCoercion::Overflow
                | SlotCoercion::Underflow
                | SlotCoercion::Truncated(_)
                | SlotCoercion::Incompatible => {
                    return Err(self.corrupt_entry("stored value does not fit its key slot"));
                }
            }
        }

        // Entries order by (key, insertion sequence): equal keys enumerate
        // in stable insertion order.
        let position = self.entries.partition_point(|entry| {
            match entry.key.key_cmp(&key) {
                Ordering::Less => true,
                Ordering::Equal => entry.seq < seq,
                Ordering::Greater => false,
            }
        });
        self.entries.insert(
            position,
            IndexEntry {
                key,
                addr,
                seq,
                extent: None,
            },
        );

        Ok(())
    }

    fn insert_spatial(
        &mut self,
        tuple: &Tuple,
        addr: TupleAddr,
        seq: u64,
    ) -> Result<(), EngineError> {
        let column = self.model.columns[0];
        let extent = match tuple.value(column) {
            Some(Value::Rect(rect)) => Some(*rect),
            // NULL geometry is indexed but can never cover a point.
            Some(Value::Null) | None => None,
            Some(_) => {
                return Err(self.corrupt_entry("spatial index column is not a rect"));
            }
        };

        self.entries.push(IndexEntry {
            key: IndexKey::all_null(1),
            addr,
            seq,
            extent,
        });

        Ok(())
    }

    fn corrupt_entry(&self, message: &str) -> EngineError {
        EngineError::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Index,
            format!("{message} (index {})", self.model.name),
        )
    }

    //
    // Rank primitives (countable indexes)
    //

    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn size(&self) -> i64 {
        self.entries.len() as i64
    }

    /// Number of entries with key `<= k` (`< k` when `strict`).
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn count_le(&self, key: &IndexKey, strict: bool) -> i64 {
        let position = if strict {
            self.lower_bound(key)
        } else {
            self.upper_bound(key)
        };

        position as i64
    }

    /// Number of entries with key `>= k` (`> k` when `strict`).
    #[must_use]
    pub fn count_ge(&self, key: &IndexKey, strict: bool) -> i64 {
        self.size() - self.count_le(key, !strict)
    }

    /// Whether any entry's key equals `k` exactly.
    #[must_use]
    pub fn has_key(&self, key: &IndexKey) -> bool {
        self.upper_bound(key) > self.lower_bound(key)
    }

    //
    // Cursor support
    //

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry(&self, position: usize) -> Option<&IndexEntry> {
        self.entries.get(position)
    }

    /// First position whose key is `>= k`.
    pub(crate) fn lower_bound(&self, key: &IndexKey) -> usize {
        self.entries
            .partition_point(|entry| entry.key.key_cmp(key) == Ordering::Less)
    }

    /// First position whose key is `> k`.
    pub(crate) fn upper_bound(&self, key: &IndexKey) -> usize {
        self.entries
            .partition_point(|entry| entry.key.key_cmp(key) != Ordering::Greater)
    }

    /// Addresses of entries whose spatial extent contains `point`, in no
    /// specified order.
    pub(crate) fn covering_cell_matches(&self, key: &IndexKey) -> Vec<TupleAddr> {
        let Some(Value::Point(point)) = key.slot(0) else {
            return Vec::new();
        };

        self.entries
            .iter()
            .filter(|entry| entry.extent.is_some_and(|extent| extent.contains(*point)))
            .map(|entry| entry.addr)
            .collect()
    }
}
