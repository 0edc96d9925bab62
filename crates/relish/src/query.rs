//! Typed query building.
//!
//! `SelectBuilder` assembles an immutable query plan from typed field
//! references and hands it to the plan runner. Queries read through a
//! `Session`; staged writes are flushed before any fetch terminal runs.

use crate::entity::Entity;
use crate::result::{FromRow, QueryResults, ResultLayout};
use crate::session::Session;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::marker::PhantomData;
use relish_core::{Error, RecordId, Result, Row, Value};
use relish_query::ast::{Expr, JoinType, SortKey};
use relish_query::executor::{DataSource, PlanRunner};
use relish_query::plan::Plan;
use relish_store::Catalog;

/// A typed reference to a table column.
///
/// Field references are declared as constants next to their entity and are
/// the entry point for predicates, ordering keys, and selections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRef {
    table: &'static str,
    column: &'static str,
    index: usize,
}

impl FieldRef {
    /// Creates a field reference.
    pub const fn new(table: &'static str, column: &'static str, index: usize) -> Self {
        Self {
            table,
            column,
            index,
        }
    }

    /// Returns the table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Returns the column name.
    pub fn column(&self) -> &'static str {
        self.column
    }

    pub(crate) fn expr(&self) -> Expr {
        Expr::column(self.table, self.column, self.index)
    }

    /// field = value
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        Predicate::new(Expr::eq(self.expr(), Expr::literal(value)))
    }

    /// field != value
    pub fn ne(self, value: impl Into<Value>) -> Predicate {
        Predicate::new(Expr::ne(self.expr(), Expr::literal(value)))
    }

    /// field > value
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        Predicate::new(Expr::gt(self.expr(), Expr::literal(value)))
    }

    /// field >= value
    pub fn ge(self, value: impl Into<Value>) -> Predicate {
        Predicate::new(Expr::ge(self.expr(), Expr::literal(value)))
    }

    /// field < value
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        Predicate::new(Expr::lt(self.expr(), Expr::literal(value)))
    }

    /// field <= value
    pub fn le(self, value: impl Into<Value>) -> Predicate {
        Predicate::new(Expr::le(self.expr(), Expr::literal(value)))
    }

    /// field = other field
    pub fn eq_field(self, other: FieldRef) -> Predicate {
        Predicate::new(Expr::eq(self.expr(), other.expr()))
    }

    /// low <= field <= high
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Predicate {
        Predicate::new(Expr::between(
            self.expr(),
            Expr::literal(low),
            Expr::literal(high),
        ))
    }

    /// field IN (values)
    pub fn in_list<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = values.into_iter().map(Expr::literal).collect();
        Predicate::new(Expr::in_list(self.expr(), list))
    }

    /// field IS NULL
    pub fn is_null(self) -> Predicate {
        Predicate::new(Expr::is_null(self.expr()))
    }

    /// field IS NOT NULL
    pub fn is_not_null(self) -> Predicate {
        Predicate::new(Expr::is_not_null(self.expr()))
    }

    /// Ascending ordering key. Nulls sort first unless overridden.
    pub fn asc(self) -> SortKey {
        SortKey::asc(self.expr())
    }

    /// Descending ordering key. Nulls sort last unless overridden.
    pub fn desc(self) -> SortKey {
        SortKey::desc(self.expr())
    }

    /// Selects this field's value.
    pub fn select(self) -> Selection {
        Selection::new(self.expr())
    }

    /// COUNT(field), counting non-null values.
    pub fn count(self) -> Selection {
        Selection::new(Expr::count(self.expr()))
    }

    /// SUM(field)
    pub fn sum(self) -> Selection {
        Selection::new(Expr::sum(self.expr()))
    }

    /// AVG(field)
    pub fn avg(self) -> Selection {
        Selection::new(Expr::avg(self.expr()))
    }

    /// MAX(field)
    pub fn max(self) -> Selection {
        Selection::new(Expr::max(self.expr()))
    }

    /// MIN(field)
    pub fn min(self) -> Selection {
        Selection::new(Expr::min(self.expr()))
    }
}

/// COUNT(*), counting rows.
pub fn count_all() -> Selection {
    Selection::new(Expr::count_star())
}

/// A boolean filter over query rows.
#[derive(Clone, Debug)]
pub struct Predicate {
    expr: Expr,
}

impl Predicate {
    fn new(expr: Expr) -> Self {
        Self { expr }
    }

    /// Both predicates must hold.
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::new(Expr::and(self.expr, other.expr))
    }

    /// Either predicate must hold.
    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::new(Expr::or(self.expr, other.expr))
    }

    /// The predicate must not hold.
    pub fn not(self) -> Predicate {
        Predicate::new(Expr::not(self.expr))
    }

    pub(crate) fn into_expr(self) -> Expr {
        self.expr
    }
}

/// One projected column of a tuple query: a field or an aggregate.
#[derive(Clone, Debug)]
pub struct Selection {
    expr: Expr,
}

impl Selection {
    fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

#[derive(Clone, Debug)]
enum JoinKind {
    /// Join derived from a reference column: source.column = target.id.
    Association(FieldRef),
    /// Join to a table, conditioned only by `on`.
    Table(&'static str),
}

#[derive(Clone, Debug)]
struct JoinSpec {
    kind: JoinKind,
    on: Option<Expr>,
    join_type: JoinType,
    fetch: bool,
}

#[derive(Clone, Debug)]
enum Projection {
    /// The root entity's full record.
    Record,
    /// Explicit field and aggregate selections.
    Selections(Vec<Selection>),
}

/// A fluent, consuming query builder.
///
/// Every method takes and returns the builder by value; the query plan is
/// assembled once, immutably, when a fetch terminal executes.
pub struct SelectBuilder<R> {
    session: Session,
    root: Option<&'static str>,
    extra_sources: Vec<&'static str>,
    joins: Vec<JoinSpec>,
    predicate: Option<Expr>,
    group_by: Vec<FieldRef>,
    order: Vec<SortKey>,
    offset: usize,
    limit: Option<usize>,
    projection: Projection,
    on_without_join: bool,
    _marker: PhantomData<R>,
}

impl<R: FromRow> SelectBuilder<R> {
    pub(crate) fn for_record(session: Session, root: &'static str) -> Self {
        Self::start(session, Some(root), Projection::Record)
    }

    pub(crate) fn for_selections(session: Session, selections: Vec<Selection>) -> Self {
        Self::start(session, None, Projection::Selections(selections))
    }

    fn start(session: Session, root: Option<&'static str>, projection: Projection) -> Self {
        Self {
            session,
            root,
            extra_sources: Vec::new(),
            joins: Vec::new(),
            predicate: None,
            group_by: Vec::new(),
            order: Vec::new(),
            offset: 0,
            limit: None,
            projection,
            on_without_join: false,
            _marker: PhantomData,
        }
    }

    /// Adds a query source. The first source becomes the root; later ones
    /// are combined as a cross product.
    pub fn from<E: Entity>(mut self) -> Self {
        if self.root.is_none() {
            self.root = Some(E::TABLE);
        } else {
            self.extra_sources.push(E::TABLE);
        }
        self
    }

    /// Filters rows. Multiple calls are combined with AND.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        let expr = predicate.into_expr();
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => Expr::and(existing, expr),
            None => expr,
        });
        self
    }

    /// Inner-joins the table referenced by the given field, matching the
    /// reference against the target's identity column.
    pub fn join(mut self, reference: FieldRef) -> Self {
        self.joins.push(JoinSpec {
            kind: JoinKind::Association(reference),
            on: None,
            join_type: JoinType::Inner,
            fetch: false,
        });
        self
    }

    /// Left-outer variant of [`join`](Self::join).
    pub fn left_join(mut self, reference: FieldRef) -> Self {
        self.joins.push(JoinSpec {
            kind: JoinKind::Association(reference),
            on: None,
            join_type: JoinType::LeftOuter,
            fetch: false,
        });
        self
    }

    /// Inner-joins an entity table without a derived condition. Use `on`
    /// to constrain it; without one this is a cross product.
    pub fn join_entity<E: Entity>(mut self) -> Self {
        self.joins.push(JoinSpec {
            kind: JoinKind::Table(E::TABLE),
            on: None,
            join_type: JoinType::Inner,
            fetch: false,
        });
        self
    }

    /// Left-outer variant of [`join_entity`](Self::join_entity).
    pub fn left_join_entity<E: Entity>(mut self) -> Self {
        self.joins.push(JoinSpec {
            kind: JoinKind::Table(E::TABLE),
            on: None,
            join_type: JoinType::LeftOuter,
            fetch: false,
        });
        self
    }

    /// Constrains the most recent join. Combined with the join's derived
    /// condition, if any, using AND.
    pub fn on(mut self, predicate: Predicate) -> Self {
        match self.joins.last_mut() {
            Some(join) => {
                let expr = predicate.into_expr();
                join.on = Some(match join.on.take() {
                    Some(existing) => Expr::and(existing, expr),
                    None => expr,
                });
            }
            None => self.on_without_join = true,
        }
        self
    }

    /// Marks the most recent join as a fetch join: the joined record is
    /// materialized into the result, resolving the owning association.
    pub fn fetch_join(mut self) -> Self {
        if let Some(join) = self.joins.last_mut() {
            join.fetch = true;
        }
        self
    }

    /// Appends an ordering key.
    pub fn order_by(mut self, key: SortKey) -> Self {
        self.order.push(key);
        self
    }

    /// Appends a grouping field. Groups are returned in the order their
    /// first row is encountered.
    pub fn group_by(mut self, field: FieldRef) -> Self {
        self.group_by.push(field);
        self
    }

    /// Skips the first `offset` result rows.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Caps the number of result rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Fetches all matching rows.
    pub fn fetch_list(self) -> Result<Vec<R>> {
        let (rows, layout) = self.run(true)?;
        rows.iter()
            .map(|values| R::from_row(values, &layout))
            .collect()
    }

    /// Fetches exactly one row. Errors with `NoResult` when nothing
    /// matches and `NonUniqueResult` when more than one row does.
    pub fn fetch_one(self) -> Result<R> {
        let (rows, layout) = self.run(true)?;
        match rows.len() {
            0 => Err(Error::NoResult),
            1 => R::from_row(&rows[0], &layout),
            count => Err(Error::NonUniqueResult { count }),
        }
    }

    /// Fetches the first matching row, if any.
    pub fn fetch_first(mut self) -> Result<Option<R>> {
        self.limit = Some(1);
        let (rows, layout) = self.run(true)?;
        match rows.first() {
            Some(values) => Ok(Some(R::from_row(values, &layout)?)),
            None => Ok(None),
        }
    }

    /// Counts all matching rows, ignoring offset and limit.
    pub fn fetch_count(self) -> Result<usize> {
        let (rows, _) = self.run(false)?;
        Ok(rows.len())
    }

    /// Fetches the requested page together with the unpaged total.
    pub fn fetch_results(self) -> Result<QueryResults<R>> {
        let limit = self.limit;
        let offset = self.offset;

        self.session.flush()?;
        let catalog = self.session.catalog();
        let catalog = catalog.borrow();
        let source = CatalogSource { catalog: &catalog };
        let runner = PlanRunner::new(&source);

        let (total_rows, _) = self.execute(&runner, &catalog, false)?;
        let (page_rows, layout) = self.execute(&runner, &catalog, true)?;

        let results = page_rows
            .iter()
            .map(|values| R::from_row(values, &layout))
            .collect::<Result<Vec<R>>>()?;

        Ok(QueryResults {
            results,
            total: total_rows.len(),
            limit,
            offset,
        })
    }

    /// Flushes staged writes, then builds and runs the plan. With `paged`
    /// false, ordering and paging are left out, which is all a count needs.
    fn run(&self, paged: bool) -> Result<(Vec<Vec<Value>>, ResultLayout)> {
        self.session.flush()?;
        let catalog = self.session.catalog();
        let catalog = catalog.borrow();
        let source = CatalogSource { catalog: &catalog };
        let runner = PlanRunner::new(&source);
        self.execute(&runner, &catalog, paged)
    }

    fn execute(
        &self,
        runner: &PlanRunner<'_, CatalogSource<'_>>,
        catalog: &Catalog,
        paged: bool,
    ) -> Result<(Vec<Vec<Value>>, ResultLayout)> {
        let (plan, layout) = self.build(catalog, paged)?;
        let relation = runner.execute(&plan)?;
        let rows = relation
            .iter()
            .map(|entry| entry.row.values().to_vec())
            .collect();
        Ok((rows, layout))
    }

    /// Assembles the plan: sources and joins, filter, grouping, ordering,
    /// paging, projection.
    fn build(&self, catalog: &Catalog, paged: bool) -> Result<(Plan, ResultLayout)> {
        if self.on_without_join {
            return Err(Error::invalid_operation("on() requires a preceding join"));
        }
        let root = self
            .root
            .ok_or_else(|| Error::invalid_operation("query has no source; call from()"))?;

        let mut plan = Plan::scan(root);
        for source in &self.extra_sources {
            plan = plan.join(Plan::scan(*source), None, JoinType::Inner);
        }

        let mut fetched: Vec<String> = Vec::new();
        for join in &self.joins {
            let (target, condition) = self.join_condition(catalog, join)?;
            plan = plan.join(Plan::scan(target.clone()), condition, join.join_type);
            if join.fetch {
                fetched.push(target);
            }
        }

        if let Some(predicate) = &self.predicate {
            plan = plan.filter(predicate.clone());
        }

        let selections: Option<&Vec<Selection>> = match &self.projection {
            Projection::Selections(s) => Some(s),
            Projection::Record => None,
        };
        let grouped = !self.group_by.is_empty()
            || selections
                .map(|s| s.iter().any(|sel| sel.expr.has_aggregate()))
                .unwrap_or(false);

        if grouped {
            let selections = selections.ok_or_else(|| {
                Error::invalid_operation("grouped queries require explicit selections")
            })?;
            let output: Vec<Expr> = selections.iter().map(|s| s.expr.clone()).collect();
            let group_exprs: Vec<Expr> = self.group_by.iter().map(|f| f.expr()).collect();
            plan = plan.aggregate(group_exprs, output.clone());

            if paged {
                if !self.order.is_empty() {
                    let keys = self
                        .order
                        .iter()
                        .map(|key| rewrite_grouped_key(key, &output))
                        .collect::<Result<Vec<SortKey>>>()?;
                    plan = plan.sort(keys);
                }
                plan = self.apply_paging(plan);
            }
            return Ok((plan, ResultLayout::new()));
        }

        if paged {
            if !self.order.is_empty() {
                plan = plan.sort(self.order.clone());
            }
            plan = self.apply_paging(plan);
        }

        match &self.projection {
            Projection::Selections(selections) => {
                let columns = selections.iter().map(|s| s.expr.clone()).collect();
                Ok((plan.project(columns), ResultLayout::new()))
            }
            Projection::Record => {
                let mut columns = Vec::new();
                let mut layout = ResultLayout::new();

                for (table, is_fetched) in core::iter::once((root, false))
                    .chain(fetched.iter().map(|t| (t.as_str(), true)))
                {
                    let schema = catalog.require_table(table)?.schema();
                    for column in schema.columns() {
                        columns.push(Expr::column(
                            String::from(table),
                            String::from(column.name()),
                            column.index(),
                        ));
                    }
                    layout.push(table, schema.columns().len(), is_fetched);
                }

                Ok((plan.project(columns), layout))
            }
        }
    }

    fn apply_paging(&self, plan: Plan) -> Plan {
        if self.limit.is_some() || self.offset > 0 {
            plan.limit(self.limit, self.offset)
        } else {
            plan
        }
    }

    /// Resolves a join spec to its target table and condition.
    fn join_condition(
        &self,
        catalog: &Catalog,
        join: &JoinSpec,
    ) -> Result<(String, Option<Expr>)> {
        match &join.kind {
            JoinKind::Table(table) => Ok((String::from(*table), join.on.clone())),
            JoinKind::Association(field) => {
                let schema = catalog.require_table(field.table)?.schema();
                let reference = schema.get_reference(field.column).ok_or_else(|| {
                    Error::invalid_operation(format!(
                        "column {}.{} references no table",
                        field.table, field.column
                    ))
                })?;
                let target = reference.table.clone();
                let target_schema = catalog.require_table(&target)?.schema();
                let id_index = target_schema
                    .get_column_index("id")
                    .ok_or_else(|| Error::column_not_found(target.clone(), "id"))?;

                let mut condition = Expr::eq(
                    field.expr(),
                    Expr::column(target.clone(), String::from("id"), id_index),
                );
                if let Some(on) = &join.on {
                    condition = Expr::and(condition, on.clone());
                }
                Ok((target, Some(condition)))
            }
        }
    }
}

/// Rewrites an ordering key of a grouped query to the matching position in
/// the grouped output.
fn rewrite_grouped_key(key: &SortKey, output: &[Expr]) -> Result<SortKey> {
    let position = output
        .iter()
        .position(|expr| exprs_match(&key.expr, expr))
        .ok_or_else(|| {
            Error::invalid_operation("ordering key of a grouped query must be selected")
        })?;
    Ok(SortKey {
        // The grouped output is addressed by absolute position.
        expr: Expr::column("", "", position),
        order: key.order,
        nulls: key.nulls,
    })
}

fn exprs_match(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Column(a), Expr::Column(b)) => a == b,
        (
            Expr::Aggregate { func: fa, expr: ea },
            Expr::Aggregate { func: fb, expr: eb },
        ) => {
            fa == fb
                && match (ea, eb) {
                    (Some(ea), Some(eb)) => exprs_match(ea, eb),
                    (None, None) => true,
                    _ => false,
                }
        }
        _ => false,
    }
}

/// Read adapter exposing the catalog's committed rows to the plan runner.
struct CatalogSource<'a> {
    catalog: &'a Catalog,
}

impl DataSource for CatalogSource<'_> {
    fn table_rows(&self, table: &str) -> Result<Vec<Rc<Row>>> {
        Ok(self.catalog.require_table(table)?.scan())
    }

    fn table_width(&self, table: &str) -> Result<usize> {
        Ok(self.catalog.require_table(table)?.schema().columns().len())
    }
}

/// Finds one record by identity.
pub(crate) fn find_by_id<E: Entity>(
    catalog: &Catalog,
    id: RecordId,
) -> Result<Option<E>> {
    let store = catalog.require_table(E::TABLE)?;
    match store.get(id) {
        Some(row) => E::from_values(row.values()).map(Some),
        None => Ok(None),
    }
}
