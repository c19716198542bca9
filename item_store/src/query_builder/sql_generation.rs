//! SQL generation
//!
//! Renders a [`QueryBuilder`] as PostgreSQL text with `$n` placeholders.

use crate::query_builder::aggregation::SelectField;
use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::filter::{
    LogicalOperator, QueryCondition, QueryFilter, QueryOperator, ValueKind,
};
use crate::query_builder::grouping::GroupBy;
use crate::query_builder::join::JoinClause;
use crate::query_builder::ordering::OrderSpec;
use serde_json::Value;

pub struct SqlGenerator;

/// Placeholder numbering shared by every clause of one statement
struct Params {
    values: Vec<Value>,
}

impl Params {
    fn new() -> Self {
        Self { values: Vec::new() }
    }

    fn push(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}

impl SqlGenerator {
    /// Build WHERE clause from conditions
    pub fn build_where_clause(conditions: &[QueryFilter]) -> (String, Vec<Value>) {
        let mut params = Params::new();
        let clause = Self::where_clause(conditions, &mut params);
        (clause, params.values)
    }

    fn where_clause(conditions: &[QueryFilter], params: &mut Params) -> String {
        if conditions.is_empty() {
            return String::new();
        }

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, params))
            .collect::<Vec<_>>()
            .join(" AND ");

        format!("WHERE {}", conditions_sql)
    }

    fn build_condition_sql(filter: &QueryFilter, params: &mut Params) -> String {
        match filter {
            QueryFilter::Condition(condition) => Self::build_single_condition_sql(condition, params),
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    return match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    };
                }
                if filters.len() == 1 {
                    return Self::build_condition_sql(&filters[0], params);
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, params))
                    .collect::<Vec<_>>()
                    .join(operator_str);

                format!("({})", group_conditions)
            }
            QueryFilter::Not(inner) => format!("NOT ({})", Self::build_condition_sql(inner, params)),
        }
    }

    fn build_single_condition_sql(condition: &QueryCondition, params: &mut Params) -> String {
        let field = &condition.field;

        // Values travel as text; timestamps are cast back on the server
        let placeholder = |value: &Value, params: &mut Params| {
            let slot = params.push(value.clone());
            match condition.kind {
                ValueKind::Timestamp => format!("{}::timestamptz", slot),
                ValueKind::Plain => slot,
            }
        };

        let binary = |symbol: &str, params: &mut Params| match &condition.value {
            Some(value) => format!("{} {} {}", field, symbol, placeholder(value, params)),
            None => "1=0".to_string(),
        };

        match &condition.operator {
            QueryOperator::Eq => match &condition.value {
                Some(value) => format!("{} = {}", field, placeholder(value, params)),
                None => format!("{} IS NULL", field),
            },
            QueryOperator::Ne => match &condition.value {
                Some(value) => format!("{} != {}", field, placeholder(value, params)),
                None => format!("{} IS NOT NULL", field),
            },
            QueryOperator::Gt => binary(">", params),
            QueryOperator::Gte => binary(">=", params),
            QueryOperator::Lt => binary("<", params),
            QueryOperator::Lte => binary("<=", params),
            QueryOperator::Like => binary("LIKE", params),
            QueryOperator::ILike => binary("ILIKE", params),
            QueryOperator::Between => match &condition.value {
                Some(Value::Array(bounds)) if bounds.len() == 2 => {
                    let low = placeholder(&bounds[0], params);
                    let high = placeholder(&bounds[1], params);
                    format!("{} BETWEEN {} AND {}", field, low, high)
                }
                _ => "1=0".to_string(),
            },
            QueryOperator::In => match &condition.value {
                Some(Value::Array(values)) if !values.is_empty() => {
                    let placeholders: Vec<String> =
                        values.iter().map(|v| placeholder(v, params)).collect();
                    format!("{} IN ({})", field, placeholders.join(", "))
                }
                _ => "1=0".to_string(), // Empty IN clause
            },
            QueryOperator::NotIn => match &condition.value {
                Some(Value::Array(values)) if !values.is_empty() => {
                    let placeholders: Vec<String> =
                        values.iter().map(|v| placeholder(v, params)).collect();
                    format!("{} NOT IN ({})", field, placeholders.join(", "))
                }
                _ => "1=1".to_string(), // Empty NOT IN clause
            },
            QueryOperator::IsNull => format!("{} IS NULL", field),
            QueryOperator::IsNotNull => format!("{} IS NOT NULL", field),
        }
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[OrderSpec]) -> String {
        if order_by.is_empty() {
            return String::new();
        }

        let order_items: Vec<String> = order_by.iter().map(OrderSpec::to_sql).collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset));
        }

        clauses.join(" ")
    }

    /// Build JOIN clauses
    pub fn build_join_clause(joins: &[JoinClause]) -> String {
        joins
            .iter()
            .map(JoinClause::to_sql)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build GROUP BY clause
    pub fn build_group_by_clause(group_by: Option<&GroupBy>) -> String {
        match group_by {
            Some(group) if !group.fields.is_empty() => {
                format!("GROUP BY {}", group.fields.join(", "))
            }
            _ => String::new(),
        }
    }

    fn having_clause(group_by: Option<&GroupBy>, params: &mut Params) -> String {
        match group_by {
            Some(group) if group.has_having() => {
                let conditions_sql = group
                    .having
                    .iter()
                    .map(|condition| Self::build_condition_sql(condition, params))
                    .collect::<Vec<_>>()
                    .join(" AND ");

                format!("HAVING {}", conditions_sql)
            }
            _ => String::new(),
        }
    }

    /// Select list rendered as one JSON object per row, keyed by [`SelectField::key`]
    pub fn build_json_select(fields: &[SelectField]) -> String {
        let pairs: Vec<String> = fields
            .iter()
            .map(|field| format!("{}, {}", Self::quote_literal(&field.key()), field.expression()))
            .collect();

        format!("json_build_object({})", pairs.join(", "))
    }

    fn quote_literal(text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }

    fn assemble(parts: &[&str]) -> String {
        parts
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `SELECT {table}.* FROM {table} ...` with joins, filters, ordering and paging
    pub fn select_statement(table: &str, query: &QueryBuilder) -> (String, Vec<Value>) {
        let mut params = Params::new();
        let projection = format!("SELECT {}.* FROM {}", table, table);
        let joins = Self::build_join_clause(&query.joins);
        let where_clause = Self::where_clause(&query.entity_rows(table).conditions, &mut params);
        let order = Self::build_order_clause(&query.order_by);
        let limit = Self::build_limit_clause(query.limit, query.offset);

        let sql = Self::assemble(&[&projection, &joins, &where_clause, &order, &limit]);
        (sql, params.values)
    }

    /// `SELECT COUNT(*) AS total ...` with the same joins and filters, nothing else
    pub fn count_statement(table: &str, query: &QueryBuilder) -> (String, Vec<Value>) {
        let mut params = Params::new();
        let projection = format!("SELECT COUNT(*) AS total FROM {}", table);
        let joins = Self::build_join_clause(&query.joins);
        let where_clause = Self::where_clause(&query.conditions, &mut params);

        let sql = Self::assemble(&[&projection, &joins, &where_clause]);
        (sql, params.values)
    }

    /// One JSON object per result row, column `row`
    pub fn tuple_statement(table: &str, query: &QueryBuilder) -> (String, Vec<Value>) {
        let mut params = Params::new();
        let select = if query.select.is_empty() {
            format!("row_to_json({})", table)
        } else {
            Self::build_json_select(&query.select)
        };
        let projection = format!("SELECT {} AS row FROM {}", select, table);
        let joins = Self::build_join_clause(&query.joins);
        let where_clause = Self::where_clause(&query.conditions, &mut params);
        let group = Self::build_group_by_clause(query.group_by.as_ref());
        let having = Self::having_clause(query.group_by.as_ref(), &mut params);
        let order = Self::build_order_clause(&query.order_by);
        let limit = Self::build_limit_clause(query.limit, query.offset);

        let sql = Self::assemble(&[
            &projection,
            &joins,
            &where_clause,
            &group,
            &having,
            &order,
            &limit,
        ]);
        (sql, params.values)
    }

    /// Base row and one joined row per result, as JSON columns `base` and
    /// `fetched`. `fetched` is NULL when the outer join found no match.
    pub fn fetch_join_statement(
        table: &str,
        fetched_ref: &str,
        fetched_key: &str,
        query: &QueryBuilder,
    ) -> (String, Vec<Value>) {
        let mut params = Params::new();
        let projection = format!(
            "SELECT row_to_json({table}) AS base, \
             CASE WHEN {fetched_ref}.{fetched_key} IS NULL THEN NULL ELSE row_to_json({fetched_ref}) END AS fetched \
             FROM {table}"
        );
        let joins = Self::build_join_clause(&query.joins);
        let where_clause = Self::where_clause(&query.entity_rows(table).conditions, &mut params);
        let order = Self::build_order_clause(&query.order_by);
        let limit = Self::build_limit_clause(query.limit, query.offset);

        let sql = Self::assemble(&[&projection, &joins, &where_clause, &order, &limit]);
        (sql, params.values)
    }
}
