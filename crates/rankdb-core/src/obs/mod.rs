//! Metrics boundary.
//!
//! Executor logic MUST NOT mutate metrics state directly. All
//! instrumentation flows through `MetricsEvent` and `MetricsSink`; this
//! module is the only bridge between execution and the process-local
//! counters.

pub mod sink;

pub use sink::{DriverKind, MetricsEvent, MetricsSink, with_metrics_sink};

use std::cell::RefCell;

///
/// MetricsCounters
///
/// Process-local (thread-local) counters accumulated by the default sink.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MetricsCounters {
    pub count_execs: u64,
    pub scan_execs: u64,
    pub join_execs: u64,
    pub rows_scanned: u64,
    pub rows_emitted: u64,
}

thread_local! {
    static STATE: RefCell<MetricsCounters> = RefCell::new(MetricsCounters::default());
}

pub(crate) fn with_state_mut<T>(f: impl FnOnce(&mut MetricsCounters) -> T) -> T {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Snapshot the current counters for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> MetricsCounters {
    STATE.with(|state| *state.borrow())
}

/// Reset all counters.
pub fn metrics_reset_all() {
    STATE.with(|state| *state.borrow_mut() = MetricsCounters::default());
}
