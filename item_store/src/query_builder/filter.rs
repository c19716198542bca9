//! Query filters
//!
//! Composable boolean predicates for WHERE and HAVING clauses.

use serde_json::Value;

/// Query condition operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    Between,   // BETWEEN (inclusive, value is a two element array)
    Like,      // LIKE
    ILike,     // ILIKE (case insensitive)
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

/// What a condition value stands for where its JSON shape is ambiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Taken at face value; strings are text
    #[default]
    Plain,
    /// RFC3339 text naming an instant
    Timestamp,
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<Value>, // None for IS NULL/IS NOT NULL
    pub kind: ValueKind,
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
    Not(Box<QueryFilter>),
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, value: Option<Value>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            value,
            kind: ValueKind::Plain,
        })
    }

    /// Mark every condition value in this filter as `kind`
    pub fn with_kind(self, kind: ValueKind) -> Self {
        match self {
            Self::Condition(condition) => Self::Condition(QueryCondition { kind, ..condition }),
            Self::Group { operator, filters } => Self::Group {
                operator,
                filters: filters.into_iter().map(|f| f.with_kind(kind)).collect(),
            },
            Self::Not(inner) => Self::Not(Box::new(inner.with_kind(kind))),
        }
    }

    /// Create AND group. An empty group matches every row.
    pub fn all(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group. An empty group matches nothing.
    pub fn any(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Always-true predicate
    pub fn always() -> Self {
        Self::all(Vec::new())
    }

    /// Chain another filter with AND: `(self) AND other`
    pub fn and(self, other: QueryFilter) -> Self {
        self.chain(LogicalOperator::And, other)
    }

    /// Chain another filter with OR: `(self) OR other`
    pub fn or(self, other: QueryFilter) -> Self {
        self.chain(LogicalOperator::Or, other)
    }

    /// Negate this filter
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    fn chain(self, operator: LogicalOperator, other: QueryFilter) -> Self {
        match self {
            // Extend a group of the same kind instead of nesting it
            Self::Group {
                operator: existing,
                mut filters,
            } if existing == operator && !filters.is_empty() => {
                filters.push(other);
                Self::Group {
                    operator,
                    filters,
                }
            }
            lhs => Self::Group {
                operator,
                filters: vec![lhs, other],
            },
        }
    }

    /// Equal condition
    pub fn eq(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value))
    }

    /// Not equal condition
    pub fn ne(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Ne, Some(value))
    }

    /// Greater than condition
    pub fn gt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gt, Some(value))
    }

    /// Greater than or equal condition
    pub fn gte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value))
    }

    /// Less than condition
    pub fn lt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lt, Some(value))
    }

    /// Less than or equal condition
    pub fn lte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value))
    }

    /// Inclusive range condition: `low <= field <= high`
    pub fn between(field: &str, low: Value, high: Value) -> Self {
        Self::condition(
            field,
            QueryOperator::Between,
            Some(Value::Array(vec![low, high])),
        )
    }

    /// LIKE condition
    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            QueryOperator::Like,
            Some(Value::String(pattern.to_string())),
        )
    }

    /// ILIKE condition (case insensitive)
    pub fn ilike(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            QueryOperator::ILike,
            Some(Value::String(pattern.to_string())),
        )
    }

    /// IN condition
    pub fn in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::In, Some(Value::Array(values)))
    }

    /// NOT IN condition
    pub fn not_in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::NotIn, Some(Value::Array(values)))
    }

    /// IS NULL condition
    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }

    /// IS NOT NULL condition
    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, None)
    }
}

impl std::ops::Not for QueryFilter {
    type Output = QueryFilter;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

/// Keep the present predicates and fold them with AND.
///
/// Returns `None` when nothing is present, which callers treat as "match all".
pub fn compose<I>(filters: I) -> Option<QueryFilter>
where
    I: IntoIterator<Item = Option<QueryFilter>>,
{
    filters
        .into_iter()
        .flatten()
        .reduce(|acc, filter| acc.and(filter))
}

/// Incremental AND accumulation starting from an always-true predicate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionBuilder {
    predicate: Option<QueryFilter>,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        Self { predicate: None }
    }

    /// Start from an initial condition
    pub fn with(initial: QueryFilter) -> Self {
        Self {
            predicate: Some(initial),
        }
    }

    /// `(accumulated) AND filter`
    pub fn and(&mut self, filter: QueryFilter) -> &mut Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    /// AND in the filter only when it is present
    pub fn and_opt(&mut self, filter: Option<QueryFilter>) -> &mut Self {
        if let Some(filter) = filter {
            self.and(filter);
        }
        self
    }

    /// `(accumulated) OR filter`. OR-ing onto the always-true start stays always-true.
    pub fn or(&mut self, filter: QueryFilter) -> &mut Self {
        if let Some(existing) = self.predicate.take() {
            self.predicate = Some(existing.or(filter));
        }
        self
    }

    /// True while no condition has been added
    pub fn is_empty(&self) -> bool {
        self.predicate.is_none()
    }

    /// The accumulated predicate, `None` meaning "match all"
    pub fn build(&self) -> Option<QueryFilter> {
        self.predicate.clone()
    }

    pub fn into_filter(self) -> Option<QueryFilter> {
        self.predicate
    }
}
