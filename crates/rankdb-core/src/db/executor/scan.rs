use crate::{
    db::{
        executor::{
            ExecContext,
            aggregate::InlineAggregate,
            expr_is_true,
            key_marshal::marshal_key,
            postfilter::CountingPostfilter,
            prime_cursor,
            projection::Projector,
            range::{StartResolution, resolve_start},
            resolve_target,
        },
        index::IndexKey,
        plan::{CompareOp, IndexScanNode},
        store::{TempTable, Tuple},
    },
    error::EngineError,
    obs::sink::{DriverKind, Span},
};

///
/// IndexScanExecutor
///
/// Range scan in three parts: position the cursor from the search key,
/// stop at the first tuple failing the end expression, and push every
/// survivor through the post-predicate and limit/offset gate into the
/// projection/aggregate/output pipeline.
///

pub struct IndexScanExecutor;

impl IndexScanExecutor {
    pub fn execute(
        ctx: &mut ExecContext<'_>,
        node: &IndexScanNode,
        sink: &mut TempTable,
    ) -> Result<(), EngineError> {
        let mut span = Span::new(DriverKind::Scan);
        let mut aggregate = node.aggregate.as_ref().map(InlineAggregate::new);

        let outcome = Self::scan(ctx, node, sink, &mut aggregate, &span);

        // The inline aggregate is finalized on success, early-empty, and
        // failure alike; the sink's single-row invariant depends on it.
        if let Some(aggregate) = aggregate.as_mut() {
            let finished = aggregate.finish(sink);
            if outcome.is_ok() {
                finished?;
                span.set_rows(1);
            }
        } else if let Ok(emitted) = &outcome {
            span.set_rows(*emitted);
        }

        outcome.map(|_| ())
    }

    // Run the scan and return the number of emitted tuples (pre-aggregate).
    fn scan(
        ctx: &mut ExecContext<'_>,
        node: &IndexScanNode,
        sink: &mut TempTable,
        aggregate: &mut Option<InlineAggregate<'_>>,
        span: &Span,
    ) -> Result<u64, EngineError> {
        let plan_debug = node.debug_info();
        let (table, index) =
            resolve_target(ctx, &node.target_table, &node.target_index, &plan_debug)?;
        let schema = index.key_schema();
        let search_keys = node.search_key_exprs.len();

        if search_keys > schema.arity() {
            return Err(EngineError::executor_invariant(format!(
                "{search_keys} search keys exceed index key arity {}",
                schema.arity()
            )));
        }
        if node.lookup_op == CompareOp::Eq && search_keys != schema.arity() {
            return Err(EngineError::unsupported_lookup(
                "eq lookup with a partial search key",
                &plan_debug,
            ));
        }

        //
        // SEARCH KEY
        //
        let mut search_key = IndexKey::all_null(schema.arity());
        let resolution = if search_keys == 0 {
            StartResolution::Positioned {
                effective_op: node.lookup_op,
                active_keys: 0,
                skip_null_engaged: false,
                sort_direction: node.sort_direction,
            }
        } else {
            let marshal = marshal_key(&node.search_key_exprs, None, schema, &mut search_key)?;
            resolve_start(node.lookup_op, &marshal, search_keys, node.sort_direction)?
        };
        let StartResolution::Positioned {
            effective_op,
            active_keys,
            skip_null_engaged: _,
            sort_direction,
        } = resolution
        else {
            // Resolved empty: no rows, and the caller finalizes any
            // inline aggregate over the empty input.
            return Ok(0);
        };

        let mut cursor = index.cursor();
        prime_cursor(
            ctx,
            "index scan",
            table,
            &mut cursor,
            effective_op,
            active_keys,
            &search_key,
            sort_direction,
            node.initial_expr.as_ref(),
            None,
            &plan_debug,
        )?;

        //
        // SCAN LOOP
        //
        let mut postfilter = CountingPostfilter::new(node.predicate.as_ref(), node.limit.as_ref());
        let projector = node.projection.as_ref().map(Projector::new);
        let mut scratch = projector
            .as_ref()
            .map(|projector| Tuple::all_null(projector.arity()));
        // The skip-null predicate is consulted over the leading run only;
        // the first non-null disengages it for the rest of the scan.
        let mut skip_null = node.skip_null_expr.as_ref();
        let mut emitted: u64 = 0;

        while postfilter.is_under_limit() {
            let Some(addr) = cursor.next() else {
                break;
            };
            span.add_scanned(1);

            if table.is_pending_delete(addr) {
                continue;
            }
            let Some(tuple) = table.tuple(addr) else {
                return Err(EngineError::executor_invariant(
                    "index entry addresses a missing tuple",
                ));
            };
            ctx.countdown_progress("index scan")?;

            if let Some(skip) = skip_null {
                if expr_is_true(skip, None, Some(tuple), "skip-null predicate")? {
                    continue;
                }
                skip_null = None;
            }

            if let Some(end) = node.end_expr.as_ref()
                && !expr_is_true(end, None, Some(tuple), "end expression")?
            {
                break;
            }

            if postfilter.eval(None, Some(tuple))? {
                if let (Some(projector), Some(scratch)) = (projector.as_ref(), scratch.as_mut()) {
                    projector.project(None, tuple, scratch)?;
                    Self::output(aggregate, sink, scratch)?;
                } else {
                    Self::output(aggregate, sink, tuple)?;
                }
                emitted += 1;
                ctx.countdown_progress("index scan")?;
            }
        }

        Ok(emitted)
    }

    fn output(
        aggregate: &mut Option<InlineAggregate<'_>>,
        sink: &mut TempTable,
        tuple: &Tuple,
    ) -> Result<(), EngineError> {
        if let Some(aggregate) = aggregate.as_mut() {
            return aggregate.advance(None, tuple);
        }

        sink.insert_temp_tuple(tuple.clone());

        Ok(())
    }
}
