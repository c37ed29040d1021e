//! Module: expr
//! Responsibility: expression trees and their three-valued evaluation.
//! Does not own: key-slot narrowing outcomes (the marshaller classifies
//! those) or plan structure.
//! Boundary: consumed by the marshaller, postfilter, and drivers.


use crate::{
    db::store::Tuple,
    value::{SlotCoercion, SqlType, Value, canonical_cmp, coerce_for_slot},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error as ThisError;

///
/// EvalError
///
/// Structured evaluation failure. The flag bits classify out-of-range
/// conditions raised inside expression evaluation (casts, arithmetic);
/// the key marshaller inspects them and maps them onto its per-component
/// outcomes. A var-length mismatch carries the narrowed value so the
/// marshaller can store the surviving prefix. Everything else is the
/// catch-all with no flags set.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("{message}")]
pub struct EvalError {
    pub flags: u8,
    pub message: String,
    pub narrowed: Option<Value>,
}

impl EvalError {
    pub const TYPE_OVERFLOW: u8 = 0x01;
    pub const TYPE_UNDERFLOW: u8 = 0x02;
    pub const TYPE_VAR_LENGTH_MISMATCH: u8 = 0x04;

    fn flagged(flags: u8, message: impl Into<String>) -> Self {
        Self {
            flags,
            message: message.into(),
            narrowed: None,
        }
    }

    fn var_length_mismatch(message: impl Into<String>, narrowed: Value) -> Self {
        Self {
            flags: Self::TYPE_VAR_LENGTH_MISMATCH,
            message: message.into(),
            narrowed: Some(narrowed),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::flagged(0, message)
    }

    #[must_use]
    pub const fn has_flag(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

///
/// CmpOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

///
/// ArithOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
}

///
/// Expr
///
/// Expression tree evaluated against an optional (outer, inner) tuple
/// pair. Plan nodes own expression trees; executors borrow them for the
/// duration of one invocation.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Expr {
    Literal(Value),
    /// Column of the inner (scanned) tuple.
    Column(usize),
    /// Column of the outer tuple (join inner-key expressions).
    OuterColumn(usize),
    Cmp {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    IsNull(Box<Expr>),
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        ty: SqlType,
        width: Option<usize>,
    },
    /// Spatial containment: does the rect operand cover the point operand.
    Contains {
        rect: Box<Expr>,
        point: Box<Expr>,
    },
}

impl Expr {
    #[must_use]
    pub const fn literal(value: Value) -> Self {
        Self::Literal(value)
    }

    #[must_use]
    pub const fn column(position: usize) -> Self {
        Self::Column(position)
    }

    #[must_use]
    pub const fn outer_column(position: usize) -> Self {
        Self::OuterColumn(position)
    }

    #[must_use]
    pub fn cmp(op: CmpOp, left: Self, right: Self) -> Self {
        Self::Cmp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn is_null(expr: Self) -> Self {
        Self::IsNull(Box::new(expr))
    }

    /// Evaluate against the given tuple pair.
    pub fn eval(
        &self,
        outer: Option<&Tuple>,
        inner: Option<&Tuple>,
    ) -> Result<Value, EvalError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Column(position) => column_value(inner, *position, "inner"),
            Self::OuterColumn(position) => column_value(outer, *position, "outer"),
            Self::Cmp { op, left, right } => {
                let left = left.eval(outer, inner)?;
                let right = right.eval(outer, inner)?;
                Ok(eval_cmp(*op, &left, &right))
            }
            Self::And(left, right) => {
                let left = truth(&left.eval(outer, inner)?)?;
                let right = truth(&right.eval(outer, inner)?)?;
                Ok(three_valued(match (left, right) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                }))
            }
            Self::Or(left, right) => {
                let left = truth(&left.eval(outer, inner)?)?;
                let right = truth(&right.eval(outer, inner)?)?;
                Ok(three_valued(match (left, right) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                }))
            }
            Self::Not(operand) => {
                let operand = truth(&operand.eval(outer, inner)?)?;
                Ok(three_valued(operand.map(|value| !value)))
            }
            Self::IsNull(operand) => {
                let operand = operand.eval(outer, inner)?;
                Ok(Value::Bool(operand.is_null()))
            }
            Self::Arith { op, left, right } => {
                let left = left.eval(outer, inner)?;
                let right = right.eval(outer, inner)?;
                eval_arith(*op, &left, &right)
            }
            Self::Cast { expr, ty, width } => {
                let value = expr.eval(outer, inner)?;
                eval_cast(&value, *ty, *width)
            }
            Self::Contains { rect, point } => {
                let rect = rect.eval(outer, inner)?;
                let point = point.eval(outer, inner)?;
                eval_contains(&rect, &point)
            }
        }
    }

    /// SQL boolean acceptance: true iff the expression evaluates to a
    /// non-null true. NULL is not true.
    pub fn eval_is_true(
        &self,
        outer: Option<&Tuple>,
        inner: Option<&Tuple>,
    ) -> Result<bool, EvalError> {
        Ok(matches!(self.eval(outer, inner)?, Value::Bool(true)))
    }
}

fn column_value(tuple: Option<&Tuple>, position: usize, side: &str) -> Result<Value, EvalError> {
    let Some(tuple) = tuple else {
        return Err(EvalError::other(format!(
            "{side} column {position} referenced without a {side} tuple"
        )));
    };

    tuple.value(position).cloned().ok_or_else(|| {
        EvalError::other(format!(
            "{side} column {position} out of range for arity {}",
            tuple.arity()
        ))
    })
}

fn eval_cmp(op: CmpOp, left: &Value, right: &Value) -> Value {
    // NULL compares to nothing: any comparison with NULL is NULL.
    if left.is_null() || right.is_null() {
        return Value::Null;
    }

    let ordering = canonical_cmp(left, right);
    let result = match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::Ne => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Lte => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Gte => ordering != Ordering::Less,
    };

    Value::Bool(result)
}

fn truth(value: &Value) -> Result<Option<bool>, EvalError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(EvalError::other(format!(
            "logical operand is not a boolean: {other}"
        ))),
    }
}

const fn three_valued(value: Option<bool>) -> Value {
    match value {
        Some(b) => Value::Bool(b),
        None => Value::Null,
    }
}

#[expect(clippy::cast_possible_truncation)]
fn eval_arith(op: ArithOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let (Some(a), Some(b)) = (left.as_i128(), right.as_i128()) else {
        return Err(EvalError::other(format!(
            "arithmetic operands are not integers: {left} {right}"
        )));
    };

    let wide = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
    };
    if wide > i128::from(i64::MAX) {
        return Err(EvalError::flagged(
            EvalError::TYPE_OVERFLOW,
            "integer arithmetic overflow",
        ));
    }
    if wide < i128::from(i64::MIN) {
        return Err(EvalError::flagged(
            EvalError::TYPE_UNDERFLOW,
            "integer arithmetic underflow",
        ));
    }

    Ok(Value::BigInt(wide as i64))
}

fn eval_cast(value: &Value, ty: SqlType, width: Option<usize>) -> Result<Value, EvalError> {
    match coerce_for_slot(value, ty, width) {
        SlotCoercion::Fit(value) => Ok(value),
        SlotCoercion::Null => Ok(Value::Null),
        SlotCoercion::Truncated(narrowed) => Err(EvalError::var_length_mismatch(
            format!("cast exceeds {ty} width"),
            narrowed,
        )),
        SlotCoercion::Overflow => Err(EvalError::flagged(
            EvalError::TYPE_OVERFLOW,
            format!("cast overflows {ty}"),
        )),
        SlotCoercion::Underflow => Err(EvalError::flagged(
            EvalError::TYPE_UNDERFLOW,
            format!("cast underflows {ty}"),
        )),
        SlotCoercion::Incompatible => Err(EvalError::other(format!(
            "cannot cast {value} to {ty}"
        ))),
    }
}

fn eval_contains(rect: &Value, point: &Value) -> Result<Value, EvalError> {
    match (rect, point) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Rect(rect), Value::Point(point)) => Ok(Value::Bool(rect.contains(*point))),
        _ => Err(EvalError::other(format!(
            "containment operands must be rect and point: {rect} {point}"
        ))),
    }
}
