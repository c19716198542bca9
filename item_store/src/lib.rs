//! Item Store - Core data-access layer for shopquery
//!
//! This crate provides the entities, the typed query builder, the dynamic
//! search repository and the two store back-ends (PostgreSQL and in-memory).

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod memory_store;
pub mod models;
pub mod pg_store;
pub mod prelude;
pub mod query_builder;
pub mod schema;
pub mod search;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use errors::StoreError;
pub use memory_store::{MemoryDatabase, MemoryStore, QueryStats, QueryStatsSnapshot};
pub use models::{Item, ItemDto, ItemDtoProj, ItemWithShop, NewItem, NewShop, Shop};
pub use pg_store::PgStore;
pub use query_builder::{
    ConditionBuilder, Page, PageRequest, QueryBuilder, QueryFilter, QueryOperator, SortOrder,
};
pub use search::{CombineStrategy, ItemRepository, ItemSearchParams, SearchOptions};
pub use traits::*;

use sqlx::PgPool;

pub type DbPool = PgPool;
