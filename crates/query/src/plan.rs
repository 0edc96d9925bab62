//! Query plan definitions.
//!
//! A `Plan` is an immutable tree of relational operators. The tree is built
//! once from a query description and executed by the `PlanRunner`.

use crate::ast::{Expr, JoinType, SortKey};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// Query plan node.
#[derive(Clone, Debug)]
pub enum Plan {
    /// Table scan.
    Scan { table: String },

    /// Join two relations. A join without a condition is a cross product.
    Join {
        left: Box<Plan>,
        right: Box<Plan>,
        condition: Option<Expr>,
        join_type: JoinType,
    },

    /// Filter (WHERE clause).
    Filter { input: Box<Plan>, predicate: Expr },

    /// Grouped aggregation.
    ///
    /// Groups appear in the output in the order their first row was seen.
    /// With an empty `group_by` the whole input forms a single group. Each
    /// output expression is either a group column or an aggregate over the
    /// group's rows.
    Aggregate {
        input: Box<Plan>,
        group_by: Vec<Expr>,
        output: Vec<Expr>,
    },

    /// Sort (ORDER BY).
    Sort { input: Box<Plan>, keys: Vec<SortKey> },

    /// Offset and limit.
    Limit {
        input: Box<Plan>,
        limit: Option<usize>,
        offset: usize,
    },

    /// Projection (SELECT columns).
    Project { input: Box<Plan>, columns: Vec<Expr> },
}

impl Plan {
    /// Creates a table scan.
    pub fn scan(table: impl Into<String>) -> Self {
        Plan::Scan {
            table: table.into(),
        }
    }

    /// Joins this plan with another.
    pub fn join(self, right: Plan, condition: Option<Expr>, join_type: JoinType) -> Self {
        Plan::Join {
            left: Box::new(self),
            right: Box::new(right),
            condition,
            join_type,
        }
    }

    /// Filters this plan with a predicate.
    pub fn filter(self, predicate: Expr) -> Self {
        Plan::Filter {
            input: Box::new(self),
            predicate,
        }
    }

    /// Aggregates this plan.
    pub fn aggregate(self, group_by: Vec<Expr>, output: Vec<Expr>) -> Self {
        Plan::Aggregate {
            input: Box::new(self),
            group_by,
            output,
        }
    }

    /// Sorts this plan.
    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        Plan::Sort {
            input: Box::new(self),
            keys,
        }
    }

    /// Applies offset and limit to this plan.
    pub fn limit(self, limit: Option<usize>, offset: usize) -> Self {
        Plan::Limit {
            input: Box::new(self),
            limit,
            offset,
        }
    }

    /// Projects this plan onto the given columns.
    pub fn project(self, columns: Vec<Expr>) -> Self {
        Plan::Project {
            input: Box::new(self),
            columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_plan_chaining() {
        let plan = Plan::scan("member")
            .filter(Expr::gt(
                Expr::column("member", "age", 2),
                Expr::literal(18i64),
            ))
            .sort(vec![SortKey::desc(Expr::column("member", "age", 2))])
            .limit(Some(2), 1)
            .project(vec![Expr::column("member", "username", 1)]);

        // The outermost node is the projection.
        let Plan::Project { input, columns } = plan else {
            panic!("expected Project");
        };
        assert_eq!(columns.len(), 1);
        assert!(matches!(*input, Plan::Limit { .. }));
    }
}
