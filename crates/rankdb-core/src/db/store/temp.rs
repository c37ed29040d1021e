use crate::db::store::Tuple;

///
/// TempTable
///
/// Output sink for one operator invocation: a scratch tuple plus an append
/// surface. A count result is a single insert of a one-column BIGINT tuple.
///

#[derive(Debug)]
pub struct TempTable {
    arity: usize,
    rows: Vec<Tuple>,
}

impl TempTable {
    #[must_use]
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Fresh all-null scratch tuple in this sink's layout.
    #[must_use]
    pub fn temp_tuple(&self) -> Tuple {
        Tuple::all_null(self.arity)
    }

    pub fn insert_temp_tuple(&mut self, tuple: Tuple) {
        self.rows.push(tuple);
    }

    #[must_use]
    pub fn rows(&self) -> &[Tuple] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
