use crate::{
    db::{
        executor::{
            ExecContext, expr_is_true,
            key_marshal::marshal_key,
            postfilter::CountingPostfilter,
            prime_cursor,
            range::{StartResolution, resolve_start},
            resolve_target,
        },
        index::IndexKey,
        plan::{CompareOp, JoinType, NestLoopIndexNode},
        store::{Table, TempTable, Tuple, TupleAddr},
    },
    error::{EngineError, ErrorClass, ErrorOrigin},
    obs::sink::{DriverKind, Span},
};

///
/// TupleMatchSet
///
/// Match bookkeeping for FULL joins over the inner table's slot arena:
/// every visible tuple starts unmatched, flips on its first join, and the
/// post-pass walks whatever stayed unmatched. Bit-per-slot gives O(1)
/// marking and O(inner) iteration.
///

#[derive(Debug)]
struct TupleMatchSet {
    matched: Vec<bool>,
}

impl TupleMatchSet {
    fn new(table: &Table) -> Self {
        Self {
            matched: vec![false; table.live_count()],
        }
    }

    fn mark_matched(&mut self, addr: TupleAddr) {
        if let Some(slot) = self.matched.get_mut(addr.0) {
            *slot = true;
        }
    }

    // Unmatched visible tuples in arena order.
    fn unmatched<'t>(&'t self, table: &'t Table) -> impl Iterator<Item = TupleAddr> + 't {
        table.live_addrs().filter(move |addr| {
            !self.matched.get(addr.0).copied().unwrap_or(true) && !table.is_pending_delete(*addr)
        })
    }
}

///
/// NestLoopIndexExecutor
///
/// Outer-table iteration times an index-driven inner scan. The inner side
/// reuses the scan semantics wholesale — key marshalling against the outer
/// tuple, range promotion, skip-null, end expression — and a resolved-empty
/// inner range is "no match", never an error. LEFT and FULL pad unmatched
/// outers with NULL inner columns; FULL additionally emits every inner
/// tuple no outer ever matched.
///

pub struct NestLoopIndexExecutor;

impl NestLoopIndexExecutor {
    #[expect(clippy::too_many_lines)]
    pub fn execute(
        ctx: &mut ExecContext<'_>,
        node: &NestLoopIndexNode,
        sink: &mut TempTable,
    ) -> Result<(), EngineError> {
        let mut span = Span::new(DriverKind::Join);
        let plan_debug = node.debug_info();
        let inner = &node.inner_scan;

        let (inner_table, index) =
            resolve_target(ctx, &inner.target_table, &inner.target_index, &plan_debug)?;
        let Some(outer_table) = ctx.db.table(&node.outer_table) else {
            return Err(EngineError::new(
                ErrorClass::NotFound,
                ErrorOrigin::Executor,
                format!("table '{}' not found; plan: {plan_debug}", node.outer_table),
            ));
        };

        let schema = index.key_schema();
        let search_keys = inner.search_key_exprs.len();
        if search_keys > schema.arity() {
            return Err(EngineError::executor_invariant(format!(
                "{search_keys} search keys exceed index key arity {}",
                schema.arity()
            )));
        }
        if inner.lookup_op == CompareOp::Eq && search_keys != schema.arity() {
            return Err(EngineError::unsupported_lookup(
                "eq lookup with a partial search key",
                &plan_debug,
            ));
        }

        let outer_cols = outer_table.model().column_count();
        if sink.arity() != outer_cols + node.output_exprs.len() {
            return Err(EngineError::executor_invariant(
                "join sink arity must be outer columns plus output expressions",
            ));
        }

        let mut postfilter =
            CountingPostfilter::new(node.where_predicate.as_ref(), node.limit.as_ref());
        let mut match_set =
            (node.join_type == JoinType::Full).then(|| TupleMatchSet::new(inner_table));
        let null_inner = Tuple::all_null(inner_table.model().column_count());
        let mut search_key = IndexKey::all_null(schema.arity());
        let mut emitted: u64 = 0;

        //
        // OUTER TABLE ITERATION
        //
        for outer_addr in outer_table.live_addrs() {
            if !postfilter.is_under_limit() {
                break;
            }
            if outer_table.is_pending_delete(outer_addr) {
                continue;
            }
            let Some(outer_tuple) = outer_table.tuple(outer_addr) else {
                return Err(EngineError::executor_invariant(
                    "outer iteration reached a missing tuple",
                ));
            };
            ctx.countdown_progress("nest loop index join")?;

            let mut outer_match = false;

            // An outer tuple failing the pre-join predicate cannot match
            // any inner tuple, but still gets outer-join padding.
            let prejoin_ok = match node.prejoin_predicate.as_ref() {
                Some(prejoin) => {
                    expr_is_true(prejoin, Some(outer_tuple), None, "pre-join predicate")?
                }
                None => true,
            };

            if prejoin_ok {
                let resolution = if search_keys == 0 {
                    StartResolution::Positioned {
                        effective_op: inner.lookup_op,
                        active_keys: 0,
                        skip_null_engaged: false,
                        sort_direction: inner.sort_direction,
                    }
                } else {
                    let marshal = marshal_key(
                        &inner.search_key_exprs,
                        Some(outer_tuple),
                        schema,
                        &mut search_key,
                    )?;
                    resolve_start(inner.lookup_op, &marshal, search_keys, inner.sort_direction)?
                };

                // Resolved empty means this outer key cannot reach the
                // index; the padding decision below still applies.
                if let StartResolution::Positioned {
                    effective_op,
                    active_keys,
                    skip_null_engaged: _,
                    sort_direction,
                } = resolution
                {
                    let mut cursor = index.cursor();
                    prime_cursor(
                        ctx,
                        "nest loop index join",
                        inner_table,
                        &mut cursor,
                        effective_op,
                        active_keys,
                        &search_key,
                        sort_direction,
                        inner.initial_expr.as_ref(),
                        Some(outer_tuple),
                        &plan_debug,
                    )?;

                    let mut skip_null = inner.skip_null_expr.as_ref();
                    while postfilter.is_under_limit() {
                        let Some(addr) = cursor.next() else {
                            break;
                        };
                        span.add_scanned(1);

                        if inner_table.is_pending_delete(addr) {
                            continue;
                        }
                        let Some(inner_tuple) = inner_table.tuple(addr) else {
                            return Err(EngineError::executor_invariant(
                                "index entry addresses a missing tuple",
                            ));
                        };
                        ctx.countdown_progress("nest loop index join")?;

                        if let Some(skip) = skip_null {
                            if expr_is_true(
                                skip,
                                Some(outer_tuple),
                                Some(inner_tuple),
                                "skip-null predicate",
                            )? {
                                continue;
                            }
                            skip_null = None;
                        }

                        if let Some(end) = inner.end_expr.as_ref()
                            && !expr_is_true(
                                end,
                                Some(outer_tuple),
                                Some(inner_tuple),
                                "end expression",
                            )?
                        {
                            break;
                        }

                        let post_ok = match inner.predicate.as_ref() {
                            Some(post) => expr_is_true(
                                post,
                                Some(outer_tuple),
                                Some(inner_tuple),
                                "join post-predicate",
                            )?,
                            None => true,
                        };
                        if post_ok {
                            outer_match = true;
                            if let Some(set) = match_set.as_mut() {
                                set.mark_matched(addr);
                            }
                            emitted += Self::emit_if_qualifies(
                                &mut postfilter,
                                sink,
                                node,
                                outer_tuple,
                                inner_tuple,
                                outer_cols,
                            )?;
                        }
                    }
                }
            }

            //
            // LEFT / FULL OUTER PADDING
            //
            if node.join_type != JoinType::Inner
                && !outer_match
                && postfilter.is_under_limit()
            {
                emitted += Self::emit_if_qualifies(
                    &mut postfilter,
                    sink,
                    node,
                    outer_tuple,
                    &null_inner,
                    outer_cols,
                )?;
            }
        }

        //
        // FULL OUTER POST-PASS
        //
        // Every inner tuple no outer matched goes out once, padded with
        // NULL outer columns.
        if let Some(set) = match_set.as_ref() {
            let null_outer = Tuple::all_null(outer_cols);
            for addr in set.unmatched(inner_table) {
                if !postfilter.is_under_limit() {
                    break;
                }
                let Some(inner_tuple) = inner_table.tuple(addr) else {
                    return Err(EngineError::executor_invariant(
                        "match map addresses a missing tuple",
                    ));
                };
                ctx.countdown_progress("nest loop index join")?;

                emitted += Self::emit_if_qualifies(
                    &mut postfilter,
                    sink,
                    node,
                    &null_outer,
                    inner_tuple,
                    outer_cols,
                )?;
            }
        }

        span.set_rows(emitted);

        Ok(())
    }

    // Where-predicate + limit/offset gate, then assemble and emit the join
    // tuple: outer columns first, inner output expressions after.
    fn emit_if_qualifies(
        postfilter: &mut CountingPostfilter<'_>,
        sink: &mut TempTable,
        node: &NestLoopIndexNode,
        outer: &Tuple,
        inner: &Tuple,
        outer_cols: usize,
    ) -> Result<u64, EngineError> {
        if !postfilter.eval(Some(outer), Some(inner))? {
            return Ok(0);
        }

        let mut join_tuple = sink.temp_tuple();
        for (position, value) in outer.values().iter().enumerate() {
            join_tuple.set_value(position, value.clone());
        }
        for (position, expr) in node.output_exprs.iter().enumerate() {
            let value = expr.eval(Some(outer), Some(inner)).map_err(|err| {
                EngineError::new(
                    ErrorClass::Internal,
                    ErrorOrigin::Expression,
                    format!("join output column {position} failed to evaluate: {err}"),
                )
            })?;
            join_tuple.set_value(outer_cols + position, value);
        }
        sink.insert_temp_tuple(join_tuple);

        Ok(1)
    }
}
