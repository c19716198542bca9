use super::filter::QueryFilter;

/// GROUP BY columns plus HAVING conditions. HAVING names select expressions
/// such as `COUNT(*)` or `AVG(items.price)`, see
/// [`super::aggregation::SelectField::expression`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupBy {
    pub fields: Vec<String>,
    pub having: Vec<QueryFilter>,
}

impl GroupBy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            having: Vec::new(),
        }
    }

    pub fn single(field: impl Into<String>) -> Self {
        Self::new([field.into()])
    }

    /// HAVING conditions are ANDed
    pub fn having(mut self, condition: QueryFilter) -> Self {
        self.having.push(condition);
        self
    }

    pub fn has_having(&self) -> bool {
        !self.having.is_empty()
    }
}
