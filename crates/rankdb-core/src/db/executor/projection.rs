use crate::{
    db::{plan::ProjectionNode, store::Tuple},
    error::{EngineError, ErrorClass, ErrorOrigin},
};

///
/// Projector
///
/// Materializes an inline projection into the scratch tuple. Borrowed from
/// the plan node for one invocation.
///

#[derive(Debug)]
pub(in crate::db::executor) struct Projector<'a> {
    node: &'a ProjectionNode,
}

impl<'a> Projector<'a> {
    pub(in crate::db::executor) const fn new(node: &'a ProjectionNode) -> Self {
        Self { node }
    }

    pub(in crate::db::executor) fn arity(&self) -> usize {
        self.node.output_exprs.len()
    }

    pub(in crate::db::executor) fn project(
        &self,
        outer: Option<&Tuple>,
        inner: &Tuple,
        scratch: &mut Tuple,
    ) -> Result<(), EngineError> {
        for (position, expr) in self.node.output_exprs.iter().enumerate() {
            let value = expr.eval(outer, Some(inner)).map_err(|err| {
                EngineError::new(
                    ErrorClass::Internal,
                    ErrorOrigin::Expression,
                    format!("projection column {position} failed to evaluate: {err}"),
                )
            })?;
            scratch.set_value(position, value);
        }

        Ok(())
    }
}
