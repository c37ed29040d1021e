use crate::value::{Value, canonical_cmp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};

///
/// IndexKey
///
/// A key tuple conforming to an index's key schema: exactly `arity` slots,
/// each NULL or a value of the slot's declared type after implicit
/// narrowing. Fresh keys start all-null; because NULL ranks below every
/// value, a partially-filled key is the canonical "smallest key with this
/// prefix" and positions range lookups without special prefix handling.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IndexKey {
    slots: Vec<Value>,
}

impl IndexKey {
    #[must_use]
    pub fn all_null(arity: usize) -> Self {
        Self {
            slots: vec![Value::Null; arity],
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn slot(&self, position: usize) -> Option<&Value> {
        self.slots.get(position)
    }

    #[must_use]
    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    /// Write one slot. Out-of-range positions are ignored; the marshaller
    /// validates positions against the schema before writing.
    pub fn set_slot(&mut self, position: usize, value: Value) {
        if let Some(slot) = self.slots.get_mut(position) {
            *slot = value;
        }
    }

    /// Reset every slot to NULL, the marshaller's starting state.
    pub fn set_all_null(&mut self) {
        for slot in &mut self.slots {
            *slot = Value::Null;
        }
    }

    /// Canonical slot-wise ordering. Keys of equal prefix order by length,
    /// though within one index all keys share an arity.
    #[must_use]
    pub fn key_cmp(&self, other: &Self) -> Ordering {
        for (left, right) in self.slots.iter().zip(other.slots.iter()) {
            let cmp = canonical_cmp(left, right);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }

        self.slots.len().cmp(&other.slots.len())
    }
}

impl Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self
            .slots
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "[{slots}]")
    }
}
