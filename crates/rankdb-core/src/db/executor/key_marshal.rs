use crate::{
    db::{
        expr::{EvalError, Expr},
        index::IndexKey,
        store::Tuple,
    },
    error::{EngineError, ErrorClass, ErrorOrigin},
    model::KeySchema,
    value::{SlotCoercion, coerce_for_slot},
};

///
/// KeyEvalOutcome
///
/// Per-component classification of search/end key evaluation. Exactly one
/// outcome applies to the first failing component; evaluation stops there.
/// Unrelated evaluator failures do not appear here: they propagate
/// verbatim as errors.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyEvalOutcome {
    /// Every requested component was evaluated and stored.
    Ok,
    /// A component evaluated to NULL; nothing was stored for it.
    NullComponent,
    Overflow,
    Underflow,
    /// A variable-length component exceeded its declared width, either at
    /// slot assignment or as a flagged error from inside the expression.
    /// The narrowed prefix *was* stored — the only non-Ok outcome that
    /// mutates the key.
    Truncated,
}

///
/// KeyMarshal
///
/// Result of marshalling one ordered expression list into a scratch key:
/// how many slots were filled cleanly, which component failed, and how.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyMarshal {
    pub filled: usize,
    pub outcome: KeyEvalOutcome,
    pub failed_at: Option<usize>,
}

impl KeyMarshal {
    /// Whether the failing component was the last one requested. The
    /// promotion rules only ever salvage a failure on the final component.
    #[must_use]
    pub fn failed_on_last(&self, requested: usize) -> bool {
        self.failed_at == requested.checked_sub(1)
    }
}

/// Evaluate key expressions left to right into `key`, which is reset to
/// all-null first. Stops at the first non-Ok outcome.
///
/// `outer` carries the outer tuple for join inner keys; plain scans and
/// counts pass `None`.
pub fn marshal_key(
    exprs: &[Expr],
    outer: Option<&Tuple>,
    schema: &KeySchema,
    key: &mut IndexKey,
) -> Result<KeyMarshal, EngineError> {
    key.set_all_null();

    for (position, expr) in exprs.iter().enumerate() {
        let Some(slot) = schema.slot(position) else {
            return Err(EngineError::executor_invariant(format!(
                "search key component {position} exceeds index key arity {}",
                schema.arity()
            )));
        };

        let value = match expr.eval(outer, None) {
            Ok(value) => value,
            Err(err) => {
                // Out-of-range and narrowing conditions raised inside the
                // expression are classified like slot-narrowing failures;
                // anything else propagates verbatim.
                if err.has_flag(EvalError::TYPE_OVERFLOW) {
                    return Ok(KeyMarshal {
                        filled: position,
                        outcome: KeyEvalOutcome::Overflow,
                        failed_at: Some(position),
                    });
                }
                if err.has_flag(EvalError::TYPE_UNDERFLOW) {
                    return Ok(KeyMarshal {
                        filled: position,
                        outcome: KeyEvalOutcome::Underflow,
                        failed_at: Some(position),
                    });
                }
                if err.has_flag(EvalError::TYPE_VAR_LENGTH_MISMATCH) {
                    // The narrowed value carried on the error still
                    // participates in the search, subject to the slot's
                    // own width.
                    if let Some(narrowed) = err.narrowed.as_ref() {
                        match coerce_for_slot(narrowed, slot.ty, slot.width) {
                            SlotCoercion::Fit(value) | SlotCoercion::Truncated(value) => {
                                key.set_slot(position, value);
                                return Ok(KeyMarshal {
                                    filled: position,
                                    outcome: KeyEvalOutcome::Truncated,
                                    failed_at: Some(position),
                                });
                            }
                            SlotCoercion::Null
                            | SlotCoercion::Overflow
                            | SlotCoercion::Underflow
                            | SlotCoercion::Incompatible => {}
                        }
                    }
                    return Err(evaluation_error(&err, position));
                }

                return Err(evaluation_error(&err, position));
            }
        };

        if value.is_null() {
            // NULL compares to nothing; the marshaller never writes NULL
            // into the key.
            return Ok(KeyMarshal {
                filled: position,
                outcome: KeyEvalOutcome::NullComponent,
                failed_at: Some(position),
            });
        }

        match coerce_for_slot(&value, slot.ty, slot.width) {
            SlotCoercion::Fit(value) => key.set_slot(position, value),
            SlotCoercion::Overflow => {
                return Ok(KeyMarshal {
                    filled: position,
                    outcome: KeyEvalOutcome::Overflow,
                    failed_at: Some(position),
                });
            }
            SlotCoercion::Underflow => {
                return Ok(KeyMarshal {
                    filled: position,
                    outcome: KeyEvalOutcome::Underflow,
                    failed_at: Some(position),
                });
            }
            SlotCoercion::Truncated(narrowed) => {
                // The narrowed prefix participates in the search; the
                // range resolver adjusts the lookup op for it.
                key.set_slot(position, narrowed);
                return Ok(KeyMarshal {
                    filled: position,
                    outcome: KeyEvalOutcome::Truncated,
                    failed_at: Some(position),
                });
            }
            SlotCoercion::Null => {
                return Ok(KeyMarshal {
                    filled: position,
                    outcome: KeyEvalOutcome::NullComponent,
                    failed_at: Some(position),
                });
            }
            SlotCoercion::Incompatible => {
                return Err(EngineError::new(
                    ErrorClass::Internal,
                    ErrorOrigin::Expression,
                    format!("search key component {position} does not fit slot type"),
                ));
            }
        }
    }

    Ok(KeyMarshal {
        filled: exprs.len(),
        outcome: KeyEvalOutcome::Ok,
        failed_at: None,
    })
}

fn evaluation_error(err: &EvalError, position: usize) -> EngineError {
    EngineError::new(
        ErrorClass::Internal,
        ErrorOrigin::Expression,
        format!("search key component {position} failed to evaluate: {err}"),
    )
}
