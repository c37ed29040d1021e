use crate::{
    db::{expr::Expr, plan::LimitNode, store::Tuple},
    error::{EngineError, ErrorClass, ErrorOrigin},
};

///
/// CountingPostfilter
///
/// The gate between per-tuple production and emission: post-predicate
/// first, then offset consumption, then limit accounting. Offset is
/// consumed only by tuples that pass the predicate; a tuple that clears
/// both is accepted and counts against the limit.
///

#[derive(Debug)]
pub(in crate::db::executor) struct CountingPostfilter<'a> {
    predicate: Option<&'a Expr>,
    offset_remaining: usize,
    limit_remaining: Option<usize>,
}

impl<'a> CountingPostfilter<'a> {
    pub(in crate::db::executor) fn new(
        predicate: Option<&'a Expr>,
        limit: Option<&LimitNode>,
    ) -> Self {
        Self {
            predicate,
            offset_remaining: limit.map_or(0, |node| node.offset),
            limit_remaining: limit.and_then(|node| node.limit),
        }
    }

    /// Whether emission may continue. Scan loops stop as soon as this goes
    /// false.
    pub(in crate::db::executor) const fn is_under_limit(&self) -> bool {
        !matches!(self.limit_remaining, Some(0))
    }

    /// Apply predicate, offset, and limit to one candidate tuple pair.
    pub(in crate::db::executor) fn eval(
        &mut self,
        outer: Option<&Tuple>,
        inner: Option<&Tuple>,
    ) -> Result<bool, EngineError> {
        if let Some(predicate) = self.predicate {
            let accepted = predicate.eval_is_true(outer, inner).map_err(|err| {
                EngineError::new(
                    ErrorClass::Internal,
                    ErrorOrigin::Expression,
                    format!("post-predicate failed to evaluate: {err}"),
                )
            })?;
            if !accepted {
                return Ok(false);
            }
        }

        if self.offset_remaining > 0 {
            self.offset_remaining -= 1;
            return Ok(false);
        }

        if let Some(remaining) = self.limit_remaining.as_mut() {
            if *remaining == 0 {
                return Ok(false);
            }
            *remaining -= 1;
        }

        Ok(true)
    }
}
