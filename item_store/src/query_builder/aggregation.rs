//! Select lists
//!
//! Every selected value has an expression (`items.price`, `AVG(items.price)`)
//! and a key it is read back under: the alias when given, else the
//! expression itself.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count | AggregateFunction::CountDistinct => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// Where a selected value comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectSource {
    Column(String),
    /// `argument: None` is `*`
    Aggregate {
        function: AggregateFunction,
        argument: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectField {
    pub source: SelectSource,
    pub alias: Option<String>,
}

impl SelectField {
    fn from_source(source: SelectSource) -> Self {
        Self {
            source,
            alias: None,
        }
    }

    fn aggregate(function: AggregateFunction, argument: Option<String>) -> Self {
        Self::from_source(SelectSource::Aggregate { function, argument })
    }

    pub fn field(field: impl Into<String>) -> Self {
        Self::from_source(SelectSource::Column(field.into()))
    }

    pub fn field_as(field: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::field(field).with_alias(alias)
    }

    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Self::aggregate(AggregateFunction::Count, None)
    }

    /// `COUNT(field)`, NULLs not counted
    pub fn count(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Count, Some(field.into()))
    }

    pub fn count_distinct(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::CountDistinct, Some(field.into()))
    }

    pub fn sum(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Sum, Some(field.into()))
    }

    pub fn avg(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Avg, Some(field.into()))
    }

    pub fn min(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Min, Some(field.into()))
    }

    pub fn max(field: impl Into<String>) -> Self {
        Self::aggregate(AggregateFunction::Max, Some(field.into()))
    }

    /// Replaces any earlier alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.source, SelectSource::Aggregate { .. })
    }

    /// SQL expression without the alias
    pub fn expression(&self) -> String {
        match &self.source {
            SelectSource::Column(column) => column.clone(),
            SelectSource::Aggregate { function, argument } => {
                let argument = match (function, argument) {
                    (AggregateFunction::CountDistinct, Some(column)) => {
                        format!("DISTINCT {}", column)
                    }
                    (_, Some(column)) => column.clone(),
                    (_, None) => "*".to_string(),
                };
                format!("{}({})", function.name(), argument)
            }
        }
    }

    /// Tuple key of this value
    pub fn key(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.expression())
    }
}
