use crate::value::SqlType;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// ColumnModel
/// Runtime-only descriptor for one table column. `width` is the declared
/// character limit for variable-length columns and is what implicit key
/// narrowing truncates to.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ColumnModel {
    pub name: String,
    pub ty: SqlType,
    pub width: Option<usize>,
}

impl ColumnModel {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty,
            width: None,
        }
    }

    #[must_use]
    pub fn with_width(name: impl Into<String>, ty: SqlType, width: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            width: Some(width),
        }
    }
}

impl Display for ColumnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            Some(width) => write!(f, "{} {}({})", self.name, self.ty, width),
            None => write!(f, "{} {}", self.name, self.ty),
        }
    }
}

///
/// TableModel
/// Runtime-only descriptor for a table used by the executors and stores.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableModel {
    pub name: String,
    pub columns: Vec<ColumnModel>,
}

impl TableModel {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<ColumnModel>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

impl Display for TableModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "{}({columns})", self.name)
    }
}
