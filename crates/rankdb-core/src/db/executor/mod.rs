//! Module: executor
//! Responsibility: the index-driven operator drivers (count, scan,
//! nest-loop-index join) and their shared key/range/postfilter plumbing.
//! Does not own: index ordering internals, expression evaluation, or plan
//! deserialization.
//! Boundary: drivers borrow plan nodes and the context for one invocation.

mod aggregate;
mod context;
mod count;
mod join;
mod key_marshal;
mod postfilter;
mod projection;
mod range;
mod scan;

#[cfg(test)]
mod tests;

pub use context::{CancelFlag, ExecContext, NoopProgress, ProgressMonitor};
pub use count::IndexCountExecutor;
pub use join::NestLoopIndexExecutor;
pub use key_marshal::{KeyEvalOutcome, KeyMarshal, marshal_key};
pub use scan::IndexScanExecutor;

use crate::{
    db::{
        expr::Expr,
        index::{IndexCursor, IndexKey, OrderedIndex},
        plan::{CompareOp, SortDirection},
        store::{Table, Tuple},
    },
    error::{EngineError, ErrorClass, ErrorOrigin},
};

// Resolve a plan node's target table and index against the catalog.
fn resolve_target<'a>(
    ctx: &ExecContext<'a>,
    table_name: &str,
    index_name: &str,
    plan_debug: &str,
) -> Result<(&'a Table, &'a OrderedIndex), EngineError> {
    let Some(table) = ctx.db.table(table_name) else {
        return Err(EngineError::new(
            ErrorClass::NotFound,
            ErrorOrigin::Executor,
            format!("table '{table_name}' not found; plan: {plan_debug}"),
        ));
    };
    let Some(index) = table.index(index_name) else {
        return Err(EngineError::invalid_index(table_name, index_name, plan_debug));
    };

    Ok((table, index))
}

// Evaluate a boolean expression against a tuple pair, mapping evaluator
// failures into engine errors.
fn expr_is_true(
    expr: &Expr,
    outer: Option<&Tuple>,
    inner: Option<&Tuple>,
    role: &str,
) -> Result<bool, EngineError> {
    expr.eval_is_true(outer, inner).map_err(|err| {
        EngineError::new(
            ErrorClass::Internal,
            ErrorOrigin::Expression,
            format!("{role} failed to evaluate: {err}"),
        )
    })
}

/// Apply one resolved start action to the cursor.
///
/// `Lte` runs the reverse-scan forward-prime: walk forward from the first
/// entry above the key, evaluating the plan's initial expression on each
/// tuple, and rewind two positions at the first failure (or reverse from
/// the index end when the walk exhausts). This keeps every comparison on
/// the cursor's forward-traversal contract.
#[expect(clippy::too_many_arguments)]
fn prime_cursor(
    ctx: &mut ExecContext<'_>,
    driver: &str,
    table: &Table,
    cursor: &mut IndexCursor<'_>,
    effective_op: CompareOp,
    active_keys: usize,
    search_key: &IndexKey,
    sort_direction: SortDirection,
    initial_expr: Option<&Expr>,
    outer: Option<&Tuple>,
    plan_debug: &str,
) -> Result<(), EngineError> {
    if active_keys == 0 {
        let to_start = sort_direction != SortDirection::Desc;
        cursor.move_to_end(to_start);
        return Ok(());
    }

    match effective_op {
        CompareOp::Eq => cursor.move_to_key(search_key),
        CompareOp::Gt => {
            cursor.move_to_greater(search_key);
        }
        CompareOp::Gte => cursor.move_to_greater_or_equal(search_key),
        CompareOp::Lt => cursor.move_to_less(search_key),
        CompareOp::Lte => {
            let exhausted = cursor.move_to_greater(search_key);
            if exhausted {
                cursor.move_to_end(false);
                return Ok(());
            }

            loop {
                let Some(addr) = cursor.next() else {
                    cursor.move_to_end(false);
                    break;
                };
                ctx.countdown_progress(driver)?;

                let Some(tuple) = table.tuple(addr) else {
                    return Err(EngineError::executor_invariant(
                        "index entry addresses a missing tuple",
                    ));
                };
                if let Some(initial) = initial_expr
                    && !expr_is_true(initial, outer, Some(tuple), "initial expression")?
                {
                    // Just passed the first failing entry: two back.
                    cursor.move_to_before_prior_entry();
                    break;
                }
            }
        }
        CompareOp::GeoContains => cursor.move_to_covering_cell(search_key),
        CompareOp::Invalid => {
            return Err(EngineError::unsupported_lookup(effective_op, plan_debug));
        }
    }

    Ok(())
}
