mod index;
mod table;

pub use index::{IndexKind, IndexModel, KeySchema, KeySlot};
pub use table::{ColumnModel, TableModel};
