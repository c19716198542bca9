//! Query builder utilities
//!
//! This module provides query construction for both store back-ends: SQL
//! rendering for PostgreSQL and row evaluation for the in-memory store.

pub mod aggregation;
pub mod builder;
pub mod column;
pub mod evaluation;
pub mod filter;
pub mod grouping;
pub mod join;
pub mod ordering;
pub mod pagination;
pub mod projection;
pub mod sql_generation;


pub use aggregation::{AggregateFunction, SelectField, SelectSource};
pub use builder::QueryBuilder;
pub use column::Column;
pub use filter::{
    compose, ConditionBuilder, LogicalOperator, QueryFilter, QueryOperator, ValueKind,
};
pub use grouping::GroupBy;
pub use join::{JoinClause, JoinCondition, JoinType};
pub use ordering::{NullsOrder, OrderSpec, SortOrder};
pub use pagination::{known_total, Page, PageRequest};
pub use projection::{Projection, Tuple};
pub use sql_generation::SqlGenerator;
