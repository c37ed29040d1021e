use crate::{
    db::{
        executor::{
            ExecContext, expr_is_true,
            key_marshal::marshal_key,
            range::{
                EndResolution, StartResolution, resolve_end, resolve_start,
                reverse_scan_null_edge,
            },
            resolve_target,
        },
        expr::Expr,
        index::{IndexCursor, IndexKey, OrderedIndex},
        plan::{CompareOp, IndexCountNode, SortDirection},
        store::{Table, TempTable},
    },
    error::EngineError,
    obs::sink::{DriverKind, Span},
    value::Value,
};

///
/// IndexCountExecutor
///
/// Produces exactly one BIGINT row by rank arithmetic on a countable
/// index. The matching cardinality is derived from two rank positions
/// taken from opposite ends of the range:
///
///   result = rk_end - rk_start - 1 + left_included + right_included
///
/// The `-1` corrects the interior entries both ranks count once; the
/// inclusion terms restore endpoints that are present and inclusive.
/// Rows are never enumerated except to step over a leading NULL run.
///

pub struct IndexCountExecutor;

impl IndexCountExecutor {
    pub fn execute(
        ctx: &mut ExecContext<'_>,
        node: &IndexCountNode,
        sink: &mut TempTable,
    ) -> Result<(), EngineError> {
        let mut span = Span::new(DriverKind::Count);
        let plan_debug = node.debug_info();

        let (table, index) = resolve_target(ctx, &node.target_table, &node.target_index, &plan_debug)?;
        if !index.is_countable() {
            return Err(EngineError::unsupported_lookup(
                "count requires a countable index",
                &plan_debug,
            ));
        }
        if sink.arity() != 1 {
            return Err(EngineError::executor_invariant(
                "count output sink must have exactly one column",
            ));
        }

        let search_keys = node.search_key_exprs.len();
        let end_keys = node.end_key_exprs.len();
        let arity = index.key_schema().arity();

        if search_keys > 0 {
            match node.lookup_op {
                CompareOp::Eq => {
                    // Partial-covering EQ must have been rewritten to GTE
                    // by the planner; a bare violation is fatal.
                    if search_keys != arity && search_keys != end_keys {
                        return Err(EngineError::unsupported_lookup(
                            "eq lookup with a partial search key",
                            &plan_debug,
                        ));
                    }
                }
                CompareOp::Gt | CompareOp::Gte => {}
                other => {
                    return Err(EngineError::unsupported_lookup(other, &plan_debug));
                }
            }
        }

        let result = Self::count_range(node, table, index, &plan_debug)?;

        let mut row = sink.temp_tuple();
        row.set_value(0, Value::BigInt(result));
        sink.insert_temp_tuple(row);
        span.set_rows(1);

        Ok(())
    }

    fn count_range(
        node: &IndexCountNode,
        table: &Table,
        index: &OrderedIndex,
        plan_debug: &str,
    ) -> Result<i64, EngineError> {
        let schema = index.key_schema();
        let search_keys = node.search_key_exprs.len();
        let end_keys = node.end_key_exprs.len();

        //
        // SEARCH KEY
        //
        let mut search_key = IndexKey::all_null(schema.arity());
        let start = if search_keys == 0 {
            None
        } else {
            let marshal = marshal_key(&node.search_key_exprs, None, schema, &mut search_key)?;
            match resolve_start(node.lookup_op, &marshal, search_keys, SortDirection::Unspecified)? {
                StartResolution::EarlyEmpty => return Ok(0),
                StartResolution::Positioned {
                    effective_op,
                    skip_null_engaged,
                    ..
                } => Some((effective_op, skip_null_engaged)),
            }
        };

        //
        // END KEY
        //
        let mut end_key = IndexKey::all_null(schema.arity());
        let end = if end_keys == 0 {
            EndResolution::Open
        } else {
            let marshal = marshal_key(&node.end_key_exprs, None, schema, &mut end_key)?;
            match resolve_end(node.end_op, &marshal, end_keys, schema, &mut end_key)? {
                EndResolution::EarlyEmpty => return Ok(0),
                bounded => bounded,
            }
        };

        let reverse_edge = reverse_scan_null_edge(search_keys, end_keys, node.end_op);
        let mut cursor = index.cursor();
        let mut reverse_edge_cursor_primed = false;

        //
        // START RANK
        //
        let mut rk_start: i64 = 0;
        let mut left_included: i64 = 0;
        if let Some((effective_op, skip_null_engaged)) = start {
            if skip_null_engaged {
                // Underflow-promoted prefix: everything from the prefix
                // position on is in range except the leading NULL run.
                cursor.move_to_greater_or_equal(&search_key);
                rk_start += Self::count_leading_nulls(
                    node.skip_null_expr.as_ref(),
                    table,
                    &mut cursor,
                    plan_debug,
                )?;
            } else if effective_op == CompareOp::Gt {
                rk_start = index.count_le(&search_key, false);
            } else if index.has_key(&search_key) {
                // GTE / EQ with the boundary present: rank of the first
                // equal entry, endpoint restored by the inclusion term.
                left_included = 1;
                rk_start = index.count_le(&search_key, true) + 1;

                if reverse_edge {
                    cursor.move_to_greater_or_equal(&search_key);
                    reverse_edge_cursor_primed = true;
                }
            } else {
                rk_start = index.count_le(&search_key, false);
            }
        }

        //
        // REVERSE-SCAN NULL EDGE
        //
        // A shorter start prefix under an LT/LTE end bound scans over the
        // leading NULL run of the longer end prefix; those entries are
        // outside the range and leave the start rank.
        if reverse_edge {
            if !reverse_edge_cursor_primed
                && start.is_none_or(|(effective_op, _)| effective_op != CompareOp::Gt)
            {
                cursor.move_to_end(true);
            }
            rk_start += Self::count_leading_nulls(
                node.skip_null_expr.as_ref(),
                table,
                &mut cursor,
                plan_debug,
            )?;
        }

        //
        // END RANK
        //
        let (rk_end, right_included): (i64, i64) = match end {
            EndResolution::Open => (index.size(), 1),
            EndResolution::Bounded { clamped: true, .. } => {
                // Rank against the clamped type maximum; entries equal to
                // the boundary are in range, the position past them is not.
                (index.count_le(&end_key, false) + 1, 0)
            }
            EndResolution::Bounded {
                end_op: CompareOp::Lt,
                ..
            } => (index.count_le(&end_key, true) + 1, 0),
            EndResolution::Bounded { .. } => {
                if index.has_key(&end_key) {
                    (index.count_le(&end_key, false), 1)
                } else {
                    (index.count_le(&end_key, true) + 1, 0)
                }
            }
            EndResolution::EarlyEmpty => {
                return Err(EngineError::executor_invariant(
                    "empty end resolution reached the rank computation",
                ));
            }
        };

        // Crossed bounds (start past end) rank negative; the empty count
        // is the correct answer for them.
        let result = rk_end - rk_start - 1 + left_included + right_included;

        Ok(result.max(0))
    }

    // Step over the leading run of tuples the skip-null predicate accepts,
    // returning how many entries leave the counted range.
    fn count_leading_nulls(
        skip_null: Option<&Expr>,
        table: &Table,
        cursor: &mut IndexCursor<'_>,
        plan_debug: &str,
    ) -> Result<i64, EngineError> {
        let Some(skip_null) = skip_null else {
            return Err(EngineError::executor_invariant(format!(
                "skip-null predicate required for null-run counting; plan: {plan_debug}"
            )));
        };

        let mut nulls = 0;
        while let Some(addr) = cursor.next() {
            let Some(tuple) = table.tuple(addr) else {
                return Err(EngineError::executor_invariant(
                    "index entry addresses a missing tuple",
                ));
            };
            if !expr_is_true(skip_null, None, Some(tuple), "skip-null predicate")? {
                break;
            }
            nulls += 1;
        }

        Ok(nulls)
    }
}
