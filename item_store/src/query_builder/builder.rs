//! Query builder
//!
//! Collects everything a SELECT needs; rendering lives in `sql_generation`
//! and in-memory execution in `memory_store`.

use crate::query_builder::aggregation::SelectField;
use crate::query_builder::filter::{ConditionBuilder, QueryFilter};
use crate::query_builder::grouping::GroupBy;
use crate::query_builder::join::{JoinClause, JoinType};
use crate::query_builder::ordering::{OrderSpec, SortOrder};
use crate::query_builder::pagination::PageRequest;
use crate::query_builder::sql_generation::SqlGenerator;
use serde_json::Value;

/// Query builder for constructing database queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) select: Vec<SelectField>,
    pub(crate) group_by: Option<GroupBy>,
    pub(crate) order_by: Vec<OrderSpec>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add a filter only when present
    pub fn filter_opt(mut self, filter: Option<QueryFilter>) -> Self {
        self.conditions.extend(filter);
        self
    }

    /// Variadic WHERE list: absent entries are dropped, the rest are ANDed
    pub fn where_all<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Option<QueryFilter>>,
    {
        self.conditions.extend(filters.into_iter().flatten());
        self
    }

    /// Use the predicate accumulated in a [`ConditionBuilder`]
    pub fn where_builder(self, builder: &ConditionBuilder) -> Self {
        self.filter_opt(builder.build())
    }

    /// Add a join
    pub fn join(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    /// Join `table` on `left_field = right_field`
    pub fn inner_join(self, table: &str, left_field: &str, right_field: &str) -> Self {
        self.join(JoinClause::new_on(JoinType::Inner, table, left_field, right_field))
    }

    pub fn left_join(self, table: &str, left_field: &str, right_field: &str) -> Self {
        self.join(JoinClause::new_on(JoinType::Left, table, left_field, right_field))
    }

    /// Choose the selected expressions (tuple queries only)
    pub fn select(mut self, fields: Vec<SelectField>) -> Self {
        self.select = fields;
        self
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, order: OrderSpec) -> Self {
        self.order_by.push(order);
        self
    }

    /// Add ordering by field name
    pub fn order_by_field(self, field: &str, order: SortOrder) -> Self {
        self.order_by(OrderSpec::new(field, order))
    }

    /// Add several orderings, applied in sequence
    pub fn order_by_all(mut self, orders: Vec<OrderSpec>) -> Self {
        self.order_by.extend(orders);
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add offset
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Apply the offset/limit of a page request (no-op when unpaged)
    pub fn page(mut self, request: &PageRequest) -> Self {
        if let Some((offset, limit)) = request.bounds() {
            self.offset = Some(offset);
            self.limit = Some(limit);
        }
        self
    }

    /// Same filters and joins, no ordering or paging. Used for count queries.
    pub fn without_paging(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            joins: self.joins.clone(),
            select: Vec::new(),
            group_by: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Keep only rows that carry a `table` row. RIGHT and FULL joins pad the
    /// relation with rows that have none; the extra condition drops them
    /// before ordering, paging and counting apply.
    pub fn entity_rows(&self, table: &str) -> Self {
        let mut scoped = self.clone();
        if self
            .joins
            .iter()
            .any(|join| join.join_type.keeps_unmatched_right())
        {
            scoped
                .conditions
                .push(QueryFilter::is_not_null(&format!("{}.id", table)));
        }
        scoped
    }

    /// True when no WHERE condition is set
    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[QueryFilter] {
        &self.conditions
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn selection(&self) -> &[SelectField] {
        &self.select
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    /// Build WHERE clause
    pub fn build_where_clause(&self) -> (String, Vec<Value>) {
        SqlGenerator::build_where_clause(&self.conditions)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self) -> String {
        SqlGenerator::build_order_clause(&self.order_by)
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(&self) -> String {
        SqlGenerator::build_limit_clause(self.limit, self.offset)
    }

    /// Build JOIN clauses
    pub fn build_join_clause(&self) -> String {
        SqlGenerator::build_join_clause(&self.joins)
    }

    /// Build complete query parts (WHERE, ORDER BY, LIMIT, Values)
    pub fn build(&self) -> (String, String, String, Vec<Value>) {
        let (where_clause, values) = self.build_where_clause();
        let order_clause = self.build_order_clause();
        let limit_clause = self.build_limit_clause();

        (where_clause, order_clause, limit_clause, values)
    }
}
