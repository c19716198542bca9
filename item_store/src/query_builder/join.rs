//! Joins
//!
//! A join names the relation it brings in and how rows pair up. Which side
//! survives without a partner decides the NULL padding of the result.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }

    /// Left rows without a match stay, right columns NULL
    pub fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinType::Left | JoinType::Full)
    }

    /// Right rows without a match stay, left columns NULL
    pub fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinType::Right | JoinType::Full)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// Qualified names on both sides, e.g. `items.shop_id = shops.id`
    On {
        left_field: String,
        right_field: String,
    },
    Using(Vec<String>),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub alias: Option<String>,
    pub condition: JoinCondition,
}

impl JoinClause {
    fn with_condition(join_type: JoinType, table: String, condition: JoinCondition) -> Self {
        Self {
            join_type,
            table,
            alias: None,
            condition,
        }
    }

    pub fn new_on(
        join_type: JoinType,
        table: impl Into<String>,
        left_field: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        let condition = JoinCondition::On {
            left_field: left_field.into(),
            right_field: right_field.into(),
        };
        Self::with_condition(join_type, table.into(), condition)
    }

    pub fn new_using(join_type: JoinType, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self::with_condition(join_type, table.into(), JoinCondition::Using(columns))
    }

    pub fn cross(table: impl Into<String>) -> Self {
        Self::with_condition(JoinType::Cross, table.into(), JoinCondition::None)
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name the joined columns are qualified with
    pub fn table_ref(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.join_type.keyword(), self.table);
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }

        match &self.condition {
            JoinCondition::On {
                left_field,
                right_field,
            } => sql.push_str(&format!(" ON {} = {}", left_field, right_field)),
            JoinCondition::Using(columns) => {
                sql.push_str(&format!(" USING ({})", columns.join(", ")))
            }
            JoinCondition::None => {}
        }
        sql
    }
}
