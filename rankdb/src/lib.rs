//! RankDB — rank-countable index traversal for an in-memory relational engine.
//!
//! This is the public meta-crate. Downstream users depend on **rankdb** only.
//!
//! It re-exports the stable public API from `rankdb-core`: values and models,
//! the countable ordered index, plan nodes, and the three index-driven
//! operator executors (count, scan, nest-loop-index join).

pub use rankdb_core as core;

pub use rankdb_core::{db, error, model, obs, value};

//
// Prelude
//

pub mod prelude {
    pub use rankdb_core::prelude::*;
}
