use crate::db::{
    index::{IndexKey, OrderedIndex},
    store::TupleAddr,
};

// Traversal state. `Forward`/`Reverse` walk the sorted entry array;
// `EqualRun` is the bounded enumeration behind `move_to_key`; `Spatial`
// holds a materialized covering-cell match list.
#[derive(Debug)]
enum CursorState {
    Unset,
    Forward { next: usize },
    Reverse { next: Option<usize> },
    EqualRun { next: usize, end: usize },
    Spatial { matches: Vec<TupleAddr>, next: usize },
}

///
/// IndexCursor
///
/// A stateful, single-threaded position over one index, scoped to one
/// driver invocation. Positioning calls select the traversal mode; `next`
/// then steps until it yields `None`. `less`-style positioning and
/// `move_to_end(false)` flip traversal to descending order.
///

#[derive(Debug)]
pub struct IndexCursor<'i> {
    index: &'i OrderedIndex,
    state: CursorState,
    // Position of the entry the last forward `next` returned, for the
    // two-back rewind used by the reverse-scan forward-prime.
    last_forward: Option<usize>,
}

impl<'i> IndexCursor<'i> {
    pub(crate) fn new(index: &'i OrderedIndex) -> Self {
        Self {
            index,
            state: CursorState::Unset,
            last_forward: None,
        }
    }

    /// Position before the first entry whose key equals `k`; `next` yields
    /// each equal entry in insertion order, then `None`.
    pub fn move_to_key(&mut self, key: &IndexKey) {
        let next = self.index.lower_bound(key);
        let end = self.index.upper_bound(key);
        self.state = CursorState::EqualRun { next, end };
        self.last_forward = None;
    }

    /// Position before the first entry with key `> k`, ascending.
    /// Returns `true` when no such entry exists (the index is exhausted),
    /// which the reverse-scan forward-prime needs to know.
    pub fn move_to_greater(&mut self, key: &IndexKey) -> bool {
        let next = self.index.upper_bound(key);
        self.state = CursorState::Forward { next };
        self.last_forward = None;

        next >= self.index.len()
    }

    /// Position before the first entry with key `>= k`, ascending.
    pub fn move_to_greater_or_equal(&mut self, key: &IndexKey) {
        let next = self.index.lower_bound(key);
        self.state = CursorState::Forward { next };
        self.last_forward = None;
    }

    /// Position before the last entry with key `< k`, descending.
    pub fn move_to_less(&mut self, key: &IndexKey) {
        let next = self.index.lower_bound(key).checked_sub(1);
        self.state = CursorState::Reverse { next };
        self.last_forward = None;
    }

    /// Position before the last entry with key `<= k`, descending.
    pub fn move_to_less_or_equal(&mut self, key: &IndexKey) {
        let next = self.index.upper_bound(key).checked_sub(1);
        self.state = CursorState::Reverse { next };
        self.last_forward = None;
    }

    /// Position at one end: ascending from the minimum when `to_start`,
    /// descending from the maximum otherwise.
    pub fn move_to_end(&mut self, to_start: bool) {
        self.state = if to_start {
            CursorState::Forward { next: 0 }
        } else {
            CursorState::Reverse {
                next: self.index.len().checked_sub(1),
            }
        };
        self.last_forward = None;
    }

    /// Position to enumerate entries whose spatial extent contains the
    /// point in `k`; order unspecified, `next` eventually yields `None`.
    pub fn move_to_covering_cell(&mut self, key: &IndexKey) {
        let matches = self.index.covering_cell_matches(key);
        self.state = CursorState::Spatial { matches, next: 0 };
        self.last_forward = None;
    }

    /// Rewind two positions after forward stepping, so the next `next`
    /// returns what was returned two calls ago, and continue descending.
    /// This is the pivot of the LTE forward-prime pattern.
    pub fn move_to_before_prior_entry(&mut self) {
        let next = self.last_forward.and_then(|last| last.checked_sub(1));
        self.state = CursorState::Reverse { next };
        self.last_forward = None;
    }

    //
    // Rank primitives (countable index only), delegated to the index so
    // drivers holding a cursor can mix positioning and rank queries.
    //

    #[must_use]
    pub fn count_le(&self, key: &IndexKey, strict: bool) -> i64 {
        self.index.count_le(key, strict)
    }

    #[must_use]
    pub fn count_ge(&self, key: &IndexKey, strict: bool) -> i64 {
        self.index.count_ge(key, strict)
    }

    #[must_use]
    pub fn has_key(&self, key: &IndexKey) -> bool {
        self.index.has_key(key)
    }

    #[must_use]
    pub fn size(&self) -> i64 {
        self.index.size()
    }

    /// Advance one step in the current traversal mode. Deterministic for a
    /// fixed snapshot; yields `None` once exhausted.
    pub fn next(&mut self) -> Option<TupleAddr> {
        match &mut self.state {
            CursorState::Unset => None,
            CursorState::Forward { next } => {
                let entry = self.index.entry(*next)?;
                self.last_forward = Some(*next);
                *next += 1;

                Some(entry.addr)
            }
            CursorState::Reverse { next } => {
                let position = (*next)?;
                let entry = self.index.entry(position)?;
                *next = position.checked_sub(1);

                Some(entry.addr)
            }
            CursorState::EqualRun { next, end } => {
                if *next >= *end {
                    return None;
                }
                let entry = self.index.entry(*next)?;
                *next += 1;

                Some(entry.addr)
            }
            CursorState::Spatial { matches, next } => {
                let addr = matches.get(*next).copied()?;
                *next += 1;

                Some(addr)
            }
        }
    }
}
