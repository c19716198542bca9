//! Convenience re-exports for common item-store usage

// Core traits
pub use crate::traits::{Entity, EntityStore, ItemStore};

// Error types
pub use crate::errors::StoreError;

// Entities and projections
pub use crate::models::{
    Item, ItemBuilder, ItemDto, ItemDtoProj, ItemWithShop, NewItem, NewShop, Shop, ShopBuilder,
};

// Schema columns
pub use crate::schema::{item, shop};

// Store back-ends
pub use crate::memory_store::{MemoryDatabase, MemoryStore, QueryStatsSnapshot};
pub use crate::pg_store::PgStore;

// Query building
pub use crate::query_builder::{
    compose, ConditionBuilder, GroupBy, JoinClause, JoinType, OrderSpec, Page, PageRequest,
    Projection, QueryBuilder, QueryFilter, SelectField, SortOrder, Tuple,
};

// Dynamic search
pub use crate::search::{CombineStrategy, ItemRepository, ItemSearchParams, SearchOptions};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::PgPool;
