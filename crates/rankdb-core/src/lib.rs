//! Core runtime for RankDB: SQL scalar values, countable ordered indexes,
//! plan nodes, and the index-driven operator executors exported via the
//! `prelude`.

pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod value;

///
/// CONSTANTS
///

/// Maximum number of key columns allowed on an index.
///
/// This bound keeps search-key scratch tuples small and makes the
/// promotion rules in the range resolver enumerable in tests.
pub const MAX_INDEX_KEY_COLUMNS: usize = 4;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{ColumnModel, IndexModel, TableModel},
        value::{SqlType, Value},
    };
}
