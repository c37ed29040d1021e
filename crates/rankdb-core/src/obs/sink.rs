use crate::obs::{self, MetricsCounters};
use std::cell::RefCell;
use std::rc::Rc;

///
/// DriverKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriverKind {
    Count,
    Scan,
    Join,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    ExecStart {
        kind: DriverKind,
    },
    ExecFinish {
        kind: DriverKind,
        rows_emitted: u64,
    },
    RowsScanned {
        rows: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

// Default sink writing into the process-local counters.
struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        obs::with_state_mut(|state| apply(state, event));
    }
}

fn apply(state: &mut MetricsCounters, event: MetricsEvent) {
    match event {
        MetricsEvent::ExecStart { kind } => match kind {
            DriverKind::Count => state.count_execs = state.count_execs.saturating_add(1),
            DriverKind::Scan => state.scan_execs = state.scan_execs.saturating_add(1),
            DriverKind::Join => state.join_execs = state.join_execs.saturating_add(1),
        },
        MetricsEvent::ExecFinish { rows_emitted, .. } => {
            state.rows_emitted = state.rows_emitted.saturating_add(rows_emitted);
        }
        MetricsEvent::RowsScanned { rows } => {
            state.rows_scanned = state.rows_scanned.saturating_add(rows);
        }
    }
}

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Run a closure with a temporary metrics sink override. The previous
/// override is restored on every exit, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0.take();
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard that emits start/finish metrics events for one driver call.
/// Ensures finish accounting happens even on unwind or early error return.
///

pub(crate) struct Span {
    kind: DriverKind,
    rows: u64,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: DriverKind) -> Self {
        record(MetricsEvent::ExecStart { kind });

        Self { kind, rows: 0 }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }

    pub(crate) fn add_scanned(&self, rows: u64) {
        record(MetricsEvent::RowsScanned { rows });
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            rows_emitted: self.rows,
        });
    }
}
