//! Module: plan
//! Responsibility: structured plan nodes the operator executors consume.
//! Does not own: planner JSON deserialization (external collaborator) or
//! execution semantics.
//! Boundary: plan nodes own expression trees; executors borrow them.


use crate::db::expr::Expr;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Write as _};

///
/// CompareOp
///
/// Index lookup operator of a plan node. `Invalid` is a sentinel for
/// pre-initialization only; reaching execute with it is a fatal
/// unsupported-lookup error.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum CompareOp {
    #[default]
    Invalid,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    GeoContains,
}

impl CompareOp {
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::Lt | Self::Lte)
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Invalid => "invalid",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::GeoContains => "geo_contains",
        };
        write!(f, "{label}")
    }
}

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum SortDirection {
    #[default]
    Unspecified,
    Asc,
    Desc,
}

///
/// JoinType
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum JoinType {
    Inner,
    Left,
    Full,
}

///
/// LimitNode
///
/// Inline limit/offset child. Absent limit means unbounded.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct LimitNode {
    pub limit: Option<usize>,
    pub offset: usize,
}

impl LimitNode {
    #[must_use]
    pub const fn new(limit: Option<usize>, offset: usize) -> Self {
        Self { limit, offset }
    }
}

///
/// AggregateOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AggregateOp {
    CountStar,
    Count,
    Sum,
    Min,
    Max,
}

///
/// AggregateNode
///
/// Inline serial aggregate child: one group, one output row.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AggregateNode {
    pub op: AggregateOp,
    pub operand: Option<Expr>,
}

///
/// ProjectionNode
///
/// Inline projection child: output expressions evaluated per emitted
/// tuple.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProjectionNode {
    pub output_exprs: Vec<Expr>,
}

///
/// IndexScanNode
///
/// Range scan over one index of one table, with optional inline
/// projection, limit, and aggregate children. Also serves as the inner
/// access description of a nest-loop-index join, in which case the
/// search-key expressions read the outer tuple.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IndexScanNode {
    pub target_table: String,
    pub target_index: String,
    pub lookup_op: CompareOp,
    pub sort_direction: SortDirection,
    pub search_key_exprs: Vec<Expr>,
    /// Post-predicate applied after positioning, before limit/offset.
    pub predicate: Option<Expr>,
    /// Scan-path range end: the scan stops at the first tuple where this
    /// evaluates false.
    pub end_expr: Option<Expr>,
    /// Reverse-scan prime predicate for the LTE forward-prime pattern.
    pub initial_expr: Option<Expr>,
    /// Skip-null predicate for underflow-promoted starts and reverse-scan
    /// edge cases.
    pub skip_null_expr: Option<Expr>,
    pub projection: Option<ProjectionNode>,
    pub limit: Option<LimitNode>,
    pub aggregate: Option<AggregateNode>,
}

impl IndexScanNode {
    #[must_use]
    pub fn new(
        target_table: impl Into<String>,
        target_index: impl Into<String>,
        lookup_op: CompareOp,
        search_key_exprs: Vec<Expr>,
    ) -> Self {
        Self {
            target_table: target_table.into(),
            target_index: target_index.into(),
            lookup_op,
            sort_direction: SortDirection::Unspecified,
            search_key_exprs,
            predicate: None,
            end_expr: None,
            initial_expr: None,
            skip_null_expr: None,
            projection: None,
            limit: None,
            aggregate: None,
        }
    }

    #[must_use]
    pub fn debug_info(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "IndexScan[{}.{} {} keys={}",
            self.target_table,
            self.target_index,
            self.lookup_op,
            self.search_key_exprs.len()
        );
        if self.predicate.is_some() {
            out.push_str(" predicate");
        }
        if self.end_expr.is_some() {
            out.push_str(" end_expr");
        }
        if self.skip_null_expr.is_some() {
            out.push_str(" skip_null");
        }
        out.push(']');

        out
    }
}

///
/// IndexCountNode
///
/// Rank-arithmetic count over a countable index: search keys bound the
/// start, end keys bound the end. No post-predicate exists on this path.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IndexCountNode {
    pub target_table: String,
    pub target_index: String,
    pub lookup_op: CompareOp,
    pub search_key_exprs: Vec<Expr>,
    pub end_op: CompareOp,
    pub end_key_exprs: Vec<Expr>,
    pub skip_null_expr: Option<Expr>,
}

impl IndexCountNode {
    #[must_use]
    pub fn new(target_table: impl Into<String>, target_index: impl Into<String>) -> Self {
        Self {
            target_table: target_table.into(),
            target_index: target_index.into(),
            lookup_op: CompareOp::Invalid,
            search_key_exprs: Vec::new(),
            end_op: CompareOp::Invalid,
            end_key_exprs: Vec::new(),
            skip_null_expr: None,
        }
    }

    #[must_use]
    pub fn debug_info(&self) -> String {
        format!(
            "IndexCount[{}.{} start={} keys={} end={} end_keys={}{}]",
            self.target_table,
            self.target_index,
            self.lookup_op,
            self.search_key_exprs.len(),
            self.end_op,
            self.end_key_exprs.len(),
            if self.skip_null_expr.is_some() {
                " skip_null"
            } else {
                ""
            }
        )
    }
}

///
/// NestLoopIndexNode
///
/// Nested-loop join whose inner side is an index access: for each outer
/// tuple, the inner scan node's search keys are evaluated against it and
/// the inner index is traversed. The join tuple is the outer columns
/// followed by the inner output expressions.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NestLoopIndexNode {
    pub join_type: JoinType,
    pub outer_table: String,
    pub inner_scan: IndexScanNode,
    /// Outer-only gate: a failing outer tuple skips the inner traversal
    /// but still gets outer-join padding.
    pub prejoin_predicate: Option<Expr>,
    pub where_predicate: Option<Expr>,
    /// Inner-side output expressions, evaluated on (outer, inner).
    pub output_exprs: Vec<Expr>,
    pub limit: Option<LimitNode>,
}

impl NestLoopIndexNode {
    #[must_use]
    pub fn new(
        join_type: JoinType,
        outer_table: impl Into<String>,
        inner_scan: IndexScanNode,
        output_exprs: Vec<Expr>,
    ) -> Self {
        Self {
            join_type,
            outer_table: outer_table.into(),
            inner_scan,
            prejoin_predicate: None,
            where_predicate: None,
            output_exprs,
            limit: None,
        }
    }

    #[must_use]
    pub fn debug_info(&self) -> String {
        format!(
            "NestLoopIndex[{:?} outer={} inner={}]",
            self.join_type,
            self.outer_table,
            self.inner_scan.debug_info()
        )
    }
}
