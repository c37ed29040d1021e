//! Module: store
//! Responsibility: in-memory table heap, tuple addressing, and output sinks.
//! Does not own: index ordering/rank logic or plan semantics.
//! Boundary: consumed by the index layer and the operator executors.

mod table;
mod temp;


pub use table::{Table, Tuple, TupleAddr};
pub use temp::TempTable;

use std::collections::BTreeMap;

///
/// Database
///
/// A handle to the set of tables visible to one execution path. The
/// executors resolve plan-node table names against this catalog; nothing
/// here is shared across threads.
///

#[derive(Debug, Default)]
pub struct Database {
    tables: BTreeMap<String, Table>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.model().name.clone(), table);
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    #[must_use]
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }
}
