use crate::{
    db::index::OrderedIndex,
    error::{EngineError, ErrorClass, ErrorOrigin},
    model::{IndexModel, TableModel},
    value::Value,
};
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// Tuple
///
/// One row's values in column order. Output tuples are owned by the sink;
/// stored tuples are owned by their table slot. Derefs to its value slice.
///

#[derive(Clone, Debug, Deref, Deserialize, PartialEq, Serialize)]
pub struct Tuple(Vec<Value>);

impl Tuple {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn all_null(arity: usize) -> Self {
        Self(vec![Value::Null; arity])
    }

    #[must_use]
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.0.get(position)
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn set_value(&mut self, position: usize, value: Value) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = value;
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "({values})")
    }
}

///
/// TupleAddr
///
/// Stable address of a stored tuple: its slot position in the owning
/// table's arena. Addresses are never reused while an operator runs, which
/// is what lets the full-join match map index by them.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    From,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct TupleAddr(pub usize);

// One arena slot. Pending-delete tuples stay live for index rank purposes
// but are skipped by row-producing scans.
#[derive(Clone, Debug)]
struct Slot {
    tuple: Tuple,
    pending_delete: bool,
}

///
/// Table
///
/// In-memory persistent-table stand-in: a slot arena of tuples plus the
/// indexes declared on it. The engine serializes access externally; during
/// one operator invocation the table is read-only.
///

#[derive(Debug)]
pub struct Table {
    model: TableModel,
    slots: Vec<Slot>,
    indexes: Vec<OrderedIndex>,
    next_seq: u64,
}

impl Table {
    #[must_use]
    pub fn new(model: TableModel) -> Self {
        Self {
            model,
            slots: Vec::new(),
            indexes: Vec::new(),
            next_seq: 0,
        }
    }

    #[must_use]
    pub const fn model(&self) -> &TableModel {
        &self.model
    }

    /// Declare an index on this table. Existing tuples are indexed
    /// immediately; later inserts maintain it.
    pub fn create_index(&mut self, model: IndexModel) -> Result<(), EngineError> {
        let Some(schema) = model.key_schema(&self.model) else {
            return Err(EngineError::new(
                ErrorClass::Unsupported,
                ErrorOrigin::Index,
                format!("index {model} has a malformed key schema for table {}", self.model.name),
            ));
        };

        let mut index = OrderedIndex::new(model, schema);
        for (position, slot) in self.slots.iter().enumerate() {
            index.insert_tuple(&slot.tuple, TupleAddr(position), self.next_seq)?;
            self.next_seq += 1;
        }
        self.indexes.push(index);

        Ok(())
    }

    /// Insert one row and maintain every declared index.
    pub fn insert(&mut self, tuple: Tuple) -> Result<TupleAddr, EngineError> {
        if tuple.arity() != self.model.column_count() {
            return Err(EngineError::new(
                ErrorClass::InvariantViolation,
                ErrorOrigin::Executor,
                format!(
                    "tuple arity {} does not match table {} with {} columns",
                    tuple.arity(),
                    self.model.name,
                    self.model.column_count()
                ),
            ));
        }

        let addr = TupleAddr(self.slots.len());
        for index in &mut self.indexes {
            index.insert_tuple(&tuple, addr, self.next_seq)?;
            self.next_seq += 1;
        }
        self.slots.push(Slot {
            tuple,
            pending_delete: false,
        });

        Ok(addr)
    }

    /// Flag a tuple as pending delete. The tuple stays in the arena and in
    /// its indexes; row-producing scans skip it.
    pub fn mark_pending_delete(&mut self, addr: TupleAddr) {
        if let Some(slot) = self.slots.get_mut(addr.0) {
            slot.pending_delete = true;
        }
    }

    #[must_use]
    pub fn tuple(&self, addr: TupleAddr) -> Option<&Tuple> {
        self.slots.get(addr.0).map(|slot| &slot.tuple)
    }

    #[must_use]
    pub fn is_pending_delete(&self, addr: TupleAddr) -> bool {
        self.slots
            .get(addr.0)
            .is_some_and(|slot| slot.pending_delete)
    }

    /// Live tuple addresses in arena order. This is the outer-table
    /// iteration order joins preserve.
    pub fn live_addrs(&self) -> impl Iterator<Item = TupleAddr> + '_ {
        (0..self.slots.len()).map(TupleAddr)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&OrderedIndex> {
        self.indexes.iter().find(|index| index.name() == name)
    }
}
