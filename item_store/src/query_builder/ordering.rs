//! Ordering
//!
//! ORDER BY entries with explicit null placement.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Where NULL values go in the ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullsOrder {
    /// Database default: NULL sorts as larger than any value
    #[default]
    Default,
    First,
    Last,
}

impl NullsOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            NullsOrder::Default => "",
            NullsOrder::First => " NULLS FIRST",
            NullsOrder::Last => " NULLS LAST",
        }
    }
}

/// A single ORDER BY entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub order: SortOrder,
    pub nulls: NullsOrder,
}

impl OrderSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
            nulls: NullsOrder::Default,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullsOrder::First;
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullsOrder::Last;
        self
    }

    /// Whether NULLs end up before non-null values for this entry
    pub fn nulls_come_first(&self) -> bool {
        match self.nulls {
            NullsOrder::First => true,
            NullsOrder::Last => false,
            NullsOrder::Default => self.order == SortOrder::Desc,
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}{}", self.field, self.order.to_sql(), self.nulls.to_sql())
    }
}
