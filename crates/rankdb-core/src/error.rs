use std::fmt;
use thiserror::Error as ThisError;

///
/// EngineError
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct EngineError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl EngineError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Named index missing on the target table. Fatal for the operator.
    pub fn invalid_index(table: &str, index: &str, plan_debug: &str) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Index,
            format!("index '{index}' not found on table '{table}'; plan: {plan_debug}"),
        )
    }

    /// Unrecognized or ill-formed compare op at execute time. Fatal.
    pub fn unsupported_lookup(detail: impl fmt::Display, plan_debug: &str) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Executor,
            format!("unsupported lookup: {detail}; plan: {plan_debug}"),
        )
    }

    pub fn executor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Executor,
            message,
        )
    }

    /// Cooperative cancellation observed between tuples.
    pub fn cancelled(driver: &str) -> Self {
        Self::new(
            ErrorClass::Cancelled,
            ErrorOrigin::Executor,
            format!("{driver} cancelled"),
        )
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.class, ErrorClass::Cancelled)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    Unsupported,
    InvariantViolation,
    Cancelled,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Value,
    Expression,
    Index,
    Plan,
    Executor,
    Sink,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Value => "value",
            Self::Expression => "expression",
            Self::Index => "index",
            Self::Plan => "plan",
            Self::Executor => "executor",
            Self::Sink => "sink",
        };
        write!(f, "{label}")
    }
}
