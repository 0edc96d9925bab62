//! Expression AST definitions.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use relish_core::Value;

/// Reference to a column in a table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Table-relative column index.
    pub index: usize,
}

impl ColumnRef {
    /// Creates a new column reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>, index: usize) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            index,
        }
    }

    /// Returns the normalized name (table.column).
    pub fn normalized_name(&self) -> String {
        alloc::format!("{}.{}", self.table, self.column)
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
}

/// Aggregate functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Null placement within a sort key, independent of the sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NullOrder {
    First,
    Last,
}

/// A single ordering key: the sorted expression, its direction, and where
/// null values land.
#[derive(Clone, Debug)]
pub struct SortKey {
    pub expr: Expr,
    pub order: SortOrder,
    pub nulls: NullOrder,
}

impl SortKey {
    /// Creates an ascending key. Nulls sort first unless overridden.
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            order: SortOrder::Asc,
            nulls: NullOrder::First,
        }
    }

    /// Creates a descending key. Nulls sort last unless overridden.
    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            order: SortOrder::Desc,
            nulls: NullOrder::Last,
        }
    }

    /// Places nulls before all non-null values for this key.
    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullOrder::First;
        self
    }

    /// Places nulls after all non-null values for this key.
    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullOrder::Last;
        self
    }
}

/// Join types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
}

/// Expression AST node.
#[derive(Clone, Debug)]
pub enum Expr {
    /// Column reference.
    Column(ColumnRef),
    /// Literal value.
    Literal(Value),
    /// Binary operation.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation.
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
    /// Aggregate function. `None` is COUNT(*).
    Aggregate {
        func: AggregateFunc,
        expr: Option<Box<Expr>>,
    },
    /// BETWEEN expression (inclusive on both ends).
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// IN expression.
    In { expr: Box<Expr>, list: Vec<Expr> },
}

impl Expr {
    /// Creates a column reference expression.
    pub fn column(table: impl Into<String>, column: impl Into<String>, index: usize) -> Self {
        Expr::Column(ColumnRef::new(table, column, index))
    }

    /// Creates a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Creates an equality expression.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::Eq, right)
    }

    /// Creates a not-equal expression.
    pub fn ne(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::Ne, right)
    }

    /// Creates a less-than expression.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::Lt, right)
    }

    /// Creates a less-than-or-equal expression.
    pub fn le(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::Le, right)
    }

    /// Creates a greater-than expression.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::Gt, right)
    }

    /// Creates a greater-than-or-equal expression.
    pub fn ge(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::Ge, right)
    }

    /// Creates an AND expression.
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::And, right)
    }

    /// Creates an OR expression.
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::binary(left, BinaryOp::Or, right)
    }

    /// Creates a NOT expression.
    pub fn not(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    /// Creates an IS NULL expression.
    pub fn is_null(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::IsNull,
            expr: Box::new(expr),
        }
    }

    /// Creates an IS NOT NULL expression.
    pub fn is_not_null(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::IsNotNull,
            expr: Box::new(expr),
        }
    }

    /// Creates a BETWEEN expression.
    pub fn between(expr: Expr, low: Expr, high: Expr) -> Self {
        Expr::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    /// Creates an IN expression.
    pub fn in_list(expr: Expr, list: Vec<Expr>) -> Self {
        Expr::In {
            expr: Box::new(expr),
            list,
        }
    }

    /// Creates a COUNT(*) aggregate.
    pub fn count_star() -> Self {
        Expr::Aggregate {
            func: AggregateFunc::Count,
            expr: None,
        }
    }

    /// Creates a COUNT(expr) aggregate.
    pub fn count(expr: Expr) -> Self {
        Expr::aggregate(AggregateFunc::Count, expr)
    }

    /// Creates a SUM aggregate.
    pub fn sum(expr: Expr) -> Self {
        Expr::aggregate(AggregateFunc::Sum, expr)
    }

    /// Creates an AVG aggregate.
    pub fn avg(expr: Expr) -> Self {
        Expr::aggregate(AggregateFunc::Avg, expr)
    }

    /// Creates a MIN aggregate.
    pub fn min(expr: Expr) -> Self {
        Expr::aggregate(AggregateFunc::Min, expr)
    }

    /// Creates a MAX aggregate.
    pub fn max(expr: Expr) -> Self {
        Expr::aggregate(AggregateFunc::Max, expr)
    }

    /// Returns true if this expression contains an aggregate anywhere.
    pub fn has_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate { .. } => true,
            Expr::Column(_) | Expr::Literal(_) => false,
            Expr::BinaryOp { left, right, .. } => left.has_aggregate() || right.has_aggregate(),
            Expr::UnaryOp { expr, .. } => expr.has_aggregate(),
            Expr::Between { expr, low, high } => {
                expr.has_aggregate() || low.has_aggregate() || high.has_aggregate()
            }
            Expr::In { expr, list } => {
                expr.has_aggregate() || list.iter().any(|e| e.has_aggregate())
            }
        }
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    fn aggregate(func: AggregateFunc, expr: Expr) -> Self {
        Expr::Aggregate {
            func,
            expr: Some(Box::new(expr)),
        }
    }
}
