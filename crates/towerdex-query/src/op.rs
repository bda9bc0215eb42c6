//! Comparison operators for comparison criteria.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// Comparison operator used by [`Criterion::Compare`](crate::Criterion::Compare).
///
/// `Before` and `After` are readable aliases for `Lt` and `Gt` on timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// At least.
    Gte,
    /// Less than.
    Lt,
    /// At most.
    Lte,
    /// Earlier than (alias for `Lt`).
    Before,
    /// Later than (alias for `Gt`).
    After,
}

impl Op {
    /// True when `field.cmp(operand) == ordering` satisfies this operator.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering.is_eq(),
            Op::Ne => ordering.is_ne(),
            Op::Gt | Op::After => ordering.is_gt(),
            Op::Gte => ordering.is_ge(),
            Op::Lt | Op::Before => ordering.is_lt(),
            Op::Lte => ordering.is_le(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Before => "before",
            Op::After => "after",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = QueryError;

    /// Parses either the operator name (`gte`) or its symbol (`>=`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" | "=" | "==" => Ok(Op::Eq),
            "ne" | "!=" => Ok(Op::Ne),
            "gt" | ">" => Ok(Op::Gt),
            "gte" | ">=" => Ok(Op::Gte),
            "lt" | "<" => Ok(Op::Lt),
            "lte" | "<=" => Ok(Op::Lte),
            "before" => Ok(Op::Before),
            "after" => Ok(Op::After),
            other => Err(QueryError::UnknownOperator(other.to_string())),
        }
    }
}
