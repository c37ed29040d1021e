use crate::{
    db::{
        plan::{AggregateNode, AggregateOp},
        store::{TempTable, Tuple},
    },
    error::{EngineError, ErrorClass, ErrorOrigin},
    value::{Value, canonical_cmp},
};
use std::cmp::Ordering;

///
/// InlineAggregate
///
/// Serial single-group aggregate inlined into a scan or join: advance once
/// per emitted tuple, finish exactly once into the sink. Drivers finish it
/// on every exit path — success, early-empty, error, and cancellation — to
/// preserve the sink's one-row invariant.
///

#[derive(Debug)]
pub(in crate::db::executor) struct InlineAggregate<'a> {
    node: &'a AggregateNode,
    rows: i64,
    sum: i128,
    extreme: Option<Value>,
    finished: bool,
}

impl<'a> InlineAggregate<'a> {
    pub(in crate::db::executor) const fn new(node: &'a AggregateNode) -> Self {
        Self {
            node,
            rows: 0,
            sum: 0,
            extreme: None,
            finished: false,
        }
    }

    pub(in crate::db::executor) fn advance(
        &mut self,
        outer: Option<&Tuple>,
        inner: &Tuple,
    ) -> Result<(), EngineError> {
        if self.node.op == AggregateOp::CountStar {
            self.rows += 1;
            return Ok(());
        }

        let Some(operand) = self.node.operand.as_ref() else {
            return Err(EngineError::executor_invariant(
                "aggregate requires an operand expression",
            ));
        };
        let value = operand.eval(outer, Some(inner)).map_err(|err| {
            EngineError::new(
                ErrorClass::Internal,
                ErrorOrigin::Expression,
                format!("aggregate operand failed to evaluate: {err}"),
            )
        })?;

        // SQL aggregates ignore NULL inputs.
        if value.is_null() {
            return Ok(());
        }

        match self.node.op {
            AggregateOp::CountStar => {}
            AggregateOp::Count => self.rows += 1,
            AggregateOp::Sum => {
                let Some(wide) = value.as_i128() else {
                    return Err(EngineError::new(
                        ErrorClass::Unsupported,
                        ErrorOrigin::Executor,
                        format!("sum operand is not an integer: {value}"),
                    ));
                };
                self.rows += 1;
                self.sum += wide;
            }
            AggregateOp::Min => {
                self.take_extreme(value, Ordering::Less);
            }
            AggregateOp::Max => {
                self.take_extreme(value, Ordering::Greater);
            }
        }

        Ok(())
    }

    fn take_extreme(&mut self, value: Value, keep: Ordering) {
        self.rows += 1;
        let better = self
            .extreme
            .as_ref()
            .is_none_or(|current| canonical_cmp(&value, current) == keep);
        if better {
            self.extreme = Some(value);
        }
    }

    /// Emit the single aggregate row. Idempotent so error paths can call
    /// it unconditionally.
    pub(in crate::db::executor) fn finish(
        &mut self,
        sink: &mut TempTable,
    ) -> Result<(), EngineError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let value = match self.node.op {
            AggregateOp::CountStar | AggregateOp::Count => Value::BigInt(self.rows),
            AggregateOp::Sum => {
                if self.rows == 0 {
                    Value::Null
                } else {
                    let narrowed = i64::try_from(self.sum).map_err(|_| {
                        EngineError::new(
                            ErrorClass::Internal,
                            ErrorOrigin::Executor,
                            "sum aggregate overflows bigint",
                        )
                    })?;
                    Value::BigInt(narrowed)
                }
            }
            AggregateOp::Min | AggregateOp::Max => {
                self.extreme.take().unwrap_or(Value::Null)
            }
        };

        let mut row = sink.temp_tuple();
        row.set_value(0, value);
        sink.insert_temp_tuple(row);

        Ok(())
    }
}
