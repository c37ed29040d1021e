use crate::{db::store::Database, error::EngineError};
use std::cell::Cell;

///
/// ProgressMonitor
///
/// Best-effort periodic progress callback. Opaque to semantics: drivers
/// call it between tuples and it must not change observable behavior.
///

pub trait ProgressMonitor {
    fn countdown_progress(&mut self);
}

///
/// NoopProgress
///

#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressMonitor for NoopProgress {
    fn countdown_progress(&mut self) {}
}

///
/// CancelFlag
///
/// Cooperative cancellation for one execution path. Execution is
/// single-threaded; the flag is polled between tuples at the progress
/// cadence.
///

#[derive(Debug, Default)]
pub struct CancelFlag {
    raised: Cell<bool>,
}

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.set(true);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.get()
    }
}

///
/// ExecContext
///
/// Everything one driver invocation borrows from the engine: the table
/// catalog, the progress monitor, and the cancellation flag. Drivers do
/// not outlive the context.
///

pub struct ExecContext<'a> {
    pub db: &'a Database,
    progress: Option<&'a mut dyn ProgressMonitor>,
    cancel: Option<&'a CancelFlag>,
}

impl<'a> ExecContext<'a> {
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            progress: None,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: &'a mut dyn ProgressMonitor) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: &'a CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Tick progress and poll cancellation. Called between tuples.
    pub(in crate::db::executor) fn countdown_progress(
        &mut self,
        driver: &str,
    ) -> Result<(), EngineError> {
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.countdown_progress();
        }
        if self.cancel.is_some_and(CancelFlag::is_raised) {
            return Err(EngineError::cancelled(driver));
        }

        Ok(())
    }
}
