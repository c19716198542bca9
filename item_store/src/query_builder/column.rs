//! Typed column handles
//!
//! A `Column<T>` knows its table-qualified name and the Rust type of its
//! values, so only sensible comparisons compile: `item::PRICE.gte(5000)`
//! works, `item::PRICE.like("%a")` does not.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::aggregation::SelectField;
use super::filter::{QueryFilter, ValueKind};
use super::ordering::OrderSpec;

/// Values that can be compared against a column
pub trait ColumnValue {
    const KIND: ValueKind = ValueKind::Plain;

    fn into_value(self) -> Value;
}

/// Types with a total order in SQL (`<`, `BETWEEN`, ...)
pub trait Ordered: ColumnValue {}

/// Types that SUM/AVG make sense for
pub trait Numeric: Ordered {}

impl ColumnValue for i32 {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl ColumnValue for i64 {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl ColumnValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl ColumnValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ColumnValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::Timestamp;

    fn into_value(self) -> Value {
        Value::String(self.to_rfc3339())
    }
}

impl Ordered for i32 {}
impl Ordered for i64 {}
impl Ordered for String {}
impl Ordered for DateTime<Utc> {}
impl Numeric for i32 {}
impl Numeric for i64 {}

/// A column of table `table` holding values of type `T`
#[derive(Debug)]
pub struct Column<T> {
    table: &'static str,
    name: &'static str,
    qualified: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Column<T> {}

impl<T> Column<T> {
    /// `qualified` must be `"{table}.{name}"`
    pub const fn new(table: &'static str, name: &'static str, qualified: &'static str) -> Self {
        Self {
            table,
            name,
            qualified,
            _type: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Table-qualified column name, e.g. `items.price`
    pub fn qualified(&self) -> &'static str {
        self.qualified
    }

    pub fn is_null(&self) -> QueryFilter {
        QueryFilter::is_null(self.qualified)
    }

    pub fn is_not_null(&self) -> QueryFilter {
        QueryFilter::is_not_null(self.qualified)
    }

    pub fn asc(&self) -> OrderSpec {
        OrderSpec::asc(self.qualified)
    }

    pub fn desc(&self) -> OrderSpec {
        OrderSpec::desc(self.qualified)
    }

    /// Select this column under its qualified name
    pub fn field(&self) -> SelectField {
        SelectField::field(self.qualified)
    }

    /// Select this column under another name
    pub fn as_(&self, alias: &str) -> SelectField {
        SelectField::field_as(self.qualified, alias)
    }

    pub fn count(&self) -> SelectField {
        SelectField::count(self.qualified)
    }

    pub fn count_distinct(&self) -> SelectField {
        SelectField::count_distinct(self.qualified)
    }
}

impl<T: ColumnValue> Column<T> {
    pub fn eq(&self, value: impl Into<T>) -> QueryFilter {
        QueryFilter::eq(self.qualified, value.into().into_value()).with_kind(T::KIND)
    }

    pub fn ne(&self, value: impl Into<T>) -> QueryFilter {
        QueryFilter::ne(self.qualified, value.into().into_value()).with_kind(T::KIND)
    }

    pub fn in_values<I, V>(&self, values: I) -> QueryFilter
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
    {
        QueryFilter::in_values(
            self.qualified,
            values.into_iter().map(|v| v.into().into_value()).collect(),
        )
        .with_kind(T::KIND)
    }

    pub fn not_in_values<I, V>(&self, values: I) -> QueryFilter
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
    {
        QueryFilter::not_in_values(
            self.qualified,
            values.into_iter().map(|v| v.into().into_value()).collect(),
        )
        .with_kind(T::KIND)
    }
}

impl<T: Ordered> Column<T> {
    pub fn lt(&self, value: impl Into<T>) -> QueryFilter {
        QueryFilter::lt(self.qualified, value.into().into_value()).with_kind(T::KIND)
    }

    pub fn lte(&self, value: impl Into<T>) -> QueryFilter {
        QueryFilter::lte(self.qualified, value.into().into_value()).with_kind(T::KIND)
    }

    pub fn gt(&self, value: impl Into<T>) -> QueryFilter {
        QueryFilter::gt(self.qualified, value.into().into_value()).with_kind(T::KIND)
    }

    pub fn gte(&self, value: impl Into<T>) -> QueryFilter {
        QueryFilter::gte(self.qualified, value.into().into_value()).with_kind(T::KIND)
    }

    /// Inclusive on both ends
    pub fn between(&self, low: impl Into<T>, high: impl Into<T>) -> QueryFilter {
        QueryFilter::between(
            self.qualified,
            low.into().into_value(),
            high.into().into_value(),
        )
        .with_kind(T::KIND)
    }

    pub fn min(&self) -> SelectField {
        SelectField::min(self.qualified)
    }

    pub fn max(&self) -> SelectField {
        SelectField::max(self.qualified)
    }
}

impl<T: Numeric> Column<T> {
    pub fn sum(&self) -> SelectField {
        SelectField::sum(self.qualified)
    }

    pub fn avg(&self) -> SelectField {
        SelectField::avg(self.qualified)
    }
}

impl Column<String> {
    /// SQL LIKE: `%` matches any run of characters, `_` exactly one
    pub fn like(&self, pattern: &str) -> QueryFilter {
        QueryFilter::like(self.qualified, pattern)
    }

    pub fn ilike(&self, pattern: &str) -> QueryFilter {
        QueryFilter::ilike(self.qualified, pattern)
    }

    pub fn contains(&self, fragment: &str) -> QueryFilter {
        self.like(&format!("%{}%", fragment))
    }

    pub fn starts_with(&self, prefix: &str) -> QueryFilter {
        self.like(&format!("{}%", prefix))
    }

    pub fn ends_with(&self, suffix: &str) -> QueryFilter {
        self.like(&format!("%{}", suffix))
    }

    /// Not NULL and not the empty string
    pub fn is_not_empty(&self) -> QueryFilter {
        self.is_not_null().and(self.ne(""))
    }
}

impl Column<DateTime<Utc>> {
    pub fn after(&self, instant: DateTime<Utc>) -> QueryFilter {
        self.gt(instant)
    }

    pub fn before(&self, instant: DateTime<Utc>) -> QueryFilter {
        self.lt(instant)
    }
}
