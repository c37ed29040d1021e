use crate::{
    db::{
        executor::key_marshal::{KeyEvalOutcome, KeyMarshal},
        index::IndexKey,
        plan::{CompareOp, SortDirection},
    },
    error::{EngineError, ErrorClass, ErrorOrigin},
    model::KeySchema,
    value::max_value_for,
};


///
/// StartResolution
///
/// Normalized start side of an effective range: either provably empty, or
/// a lookup op (possibly promoted), the number of key components that
/// participate, and whether the skip-null policy is engaged for an
/// underflow-promoted prefix.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(in crate::db::executor) enum StartResolution {
    EarlyEmpty,
    Positioned {
        effective_op: CompareOp,
        active_keys: usize,
        skip_null_engaged: bool,
        sort_direction: SortDirection,
    },
}

///
/// EndResolution
///
/// Normalized end side for the count path. The scan path expresses its end
/// as a per-tuple end expression instead.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(in crate::db::executor) enum EndResolution {
    EarlyEmpty,
    /// No end keys: the range runs to the index end.
    Open,
    Bounded {
        end_op: CompareOp,
        /// The final slot was clamped to the type maximum after overflow;
        /// ranks fall back to that boundary.
        clamped: bool,
    },
}

/// Resolve the start side from the marshal result.
///
/// This is the promotion state machine: out-of-range and truncated search
/// keys either empty the range outright or rewrite the lookup op on the
/// surviving prefix. Callers with zero requested keys position at an index
/// end instead and never call this.
pub(in crate::db::executor) fn resolve_start(
    op: CompareOp,
    marshal: &KeyMarshal,
    requested: usize,
    sort_direction: SortDirection,
) -> Result<StartResolution, EngineError> {
    debug_assert!(requested > 0);

    match marshal.outcome {
        KeyEvalOutcome::Ok => Ok(StartResolution::Positioned {
            effective_op: op,
            active_keys: requested,
            skip_null_engaged: false,
            sort_direction,
        }),

        // A NULL component compares to nothing anywhere in the key.
        KeyEvalOutcome::NullComponent => Ok(StartResolution::EarlyEmpty),

        // Equality never survives an out-of-range or narrowed component,
        // and neither does a failure before the final component: all
        // longer prefixes are gone from the key space.
        KeyEvalOutcome::Overflow | KeyEvalOutcome::Underflow | KeyEvalOutcome::Truncated
            if op == CompareOp::Eq || !marshal.failed_on_last(requested) =>
        {
            Ok(StartResolution::EarlyEmpty)
        }

        KeyEvalOutcome::Overflow => match op {
            // Nothing is greater than a value above the type range.
            CompareOp::Gt | CompareOp::Gte => Ok(StartResolution::EarlyEmpty),
            // Everything with this prefix is below the overflowed bound:
            // prime a reverse scan from the prefix top via forward LTE.
            CompareOp::Lt | CompareOp::Lte => Ok(StartResolution::Positioned {
                effective_op: CompareOp::Lte,
                active_keys: marshal.filled,
                skip_null_engaged: false,
                sort_direction: defaulted(sort_direction),
            }),
            CompareOp::Eq | CompareOp::GeoContains | CompareOp::Invalid => {
                Err(promotion_unsupported(op))
            }
        },

        KeyEvalOutcome::Underflow => match op {
            // Nothing is less than a value below the type range.
            CompareOp::Lt | CompareOp::Lte => Ok(StartResolution::EarlyEmpty),
            // GT, never GTE: a GTE prefix probe would match the NULL run
            // at the low end of the index. The skip-null predicate
            // discards that run instead.
            CompareOp::Gt | CompareOp::Gte => Ok(StartResolution::Positioned {
                effective_op: CompareOp::Gt,
                active_keys: marshal.filled,
                skip_null_engaged: true,
                sort_direction: defaulted(sort_direction),
            }),
            CompareOp::Eq | CompareOp::GeoContains | CompareOp::Invalid => {
                Err(promotion_unsupported(op))
            }
        },

        KeyEvalOutcome::Truncated => {
            // The narrowed prefix is in the slot and participates in the
            // search; only the edge semantics change.
            //   COL <  'abcd' on VARCHAR(2)  ->  COL <= 'ab'
            //   COL >= 'abcd' on VARCHAR(2)  ->  COL >  'ab'
            let effective_op = match op {
                CompareOp::Lt | CompareOp::Lte => CompareOp::Lte,
                CompareOp::Gt | CompareOp::Gte => CompareOp::Gt,
                CompareOp::Eq | CompareOp::GeoContains | CompareOp::Invalid => {
                    return Err(promotion_unsupported(op));
                }
            };

            Ok(StartResolution::Positioned {
                effective_op,
                active_keys: marshal.filled + 1,
                skip_null_engaged: false,
                sort_direction: defaulted(sort_direction),
            })
        }
    }
}

/// Resolve the end side (count path only). `end_key` already holds the
/// marshalled components; an overflowed final component is clamped in
/// place to the slot type's maximum.
pub(in crate::db::executor) fn resolve_end(
    end_op: CompareOp,
    marshal: &KeyMarshal,
    requested: usize,
    schema: &KeySchema,
    end_key: &mut IndexKey,
) -> Result<EndResolution, EngineError> {
    if requested == 0 {
        return Ok(EndResolution::Open);
    }
    if !matches!(end_op, CompareOp::Lt | CompareOp::Lte) {
        return Err(EngineError::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Executor,
            format!("end bound must be lt or lte, got {end_op}"),
        ));
    }

    match marshal.outcome {
        KeyEvalOutcome::Ok => Ok(EndResolution::Bounded {
            end_op,
            clamped: false,
        }),

        KeyEvalOutcome::NullComponent => Ok(EndResolution::EarlyEmpty),

        // Out of range before the final component bounds away the whole
        // prefix space.
        KeyEvalOutcome::Overflow | KeyEvalOutcome::Underflow
            if !marshal.failed_on_last(requested) =>
        {
            Ok(EndResolution::EarlyEmpty)
        }

        // An upper bound below the type range excludes everything.
        KeyEvalOutcome::Underflow => Ok(EndResolution::EarlyEmpty),

        // An upper bound above the type range is the type maximum; the
        // rank computation runs against that clamped boundary.
        KeyEvalOutcome::Overflow => {
            let position = requested - 1;
            let slot = schema.slot(position).ok_or_else(|| {
                EngineError::executor_invariant(format!(
                    "end key component {position} exceeds index key arity {}",
                    schema.arity()
                ))
            })?;
            let max = max_value_for(slot.ty).ok_or_else(|| {
                EngineError::executor_invariant(format!(
                    "slot type {} has no clamp boundary",
                    slot.ty
                ))
            })?;
            end_key.set_slot(position, max);

            Ok(EndResolution::Bounded {
                end_op,
                clamped: true,
            })
        }

        // Variable-length narrowing is not a recognized boundary on the
        // count path.
        KeyEvalOutcome::Truncated => Err(EngineError::new(
            ErrorClass::Internal,
            ErrorOrigin::Expression,
            "end key component exceeds its declared width",
        )),
    }
}

/// Skip-null also engages for the reverse-scan edge: a shorter start
/// prefix under an LT/LTE end bound walks over the leading NULL run of
/// the longer end prefix.
pub(in crate::db::executor) const fn reverse_scan_null_edge(
    search_keys: usize,
    end_keys: usize,
    end_op: CompareOp,
) -> bool {
    search_keys < end_keys && matches!(end_op, CompareOp::Lt | CompareOp::Lte)
}

const fn defaulted(sort_direction: SortDirection) -> SortDirection {
    match sort_direction {
        SortDirection::Unspecified => SortDirection::Asc,
        other => other,
    }
}

fn promotion_unsupported(op: CompareOp) -> EngineError {
    EngineError::new(
        ErrorClass::Unsupported,
        ErrorOrigin::Executor,
        format!("lookup {op} cannot survive an out-of-range search key"),
    )
}
