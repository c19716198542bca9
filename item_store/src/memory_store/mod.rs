//! In-memory store
//!
//! Holds both tables in process and answers the same [`crate::QueryBuilder`]
//! queries as the PostgreSQL store, including joins, grouping and paging.
//! Every query is counted by kind in [`QueryStats`].

mod engine;
mod store;

#[cfg(test)]
mod tests;

use chrono::Utc;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::models::{Item, Shop};
use crate::query_builder::evaluation::Row;
use crate::schema;
use crate::traits::Entity;

/// Rows of one table keyed by id
#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Entity> Table<T> {
    /// Store `new` under the next id (ids start at 1 and are never reused)
    fn insert(&mut self, new: T::New) -> T {
        self.last_id += 1;
        let row = T::materialize(new, self.last_id, Utc::now());
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn to_rows(&self) -> Result<Vec<Row>, StoreError> {
        self.rows
            .values()
            .map(|entity| serde_json::from_value(serde_json::to_value(entity)?))
            .collect::<Result<Vec<Row>, serde_json::Error>>()
            .map_err(StoreError::from)
    }
}

/// Number of queries served, by kind
#[derive(Debug, Default)]
pub struct QueryStats {
    selects: AtomicU64,
    counts: AtomicU64,
    tuples: AtomicU64,
}

/// Point-in-time copy of [`QueryStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryStatsSnapshot {
    pub selects: u64,
    pub counts: u64,
    pub tuples: u64,
}

impl QueryStats {
    pub(crate) fn record_select(&self) {
        self.selects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_count(&self) {
        self.counts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tuples(&self) {
        self.tuples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> QueryStatsSnapshot {
        QueryStatsSnapshot {
            selects: self.selects.load(Ordering::Relaxed),
            counts: self.counts.load(Ordering::Relaxed),
            tuples: self.tuples.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.selects.store(0, Ordering::Relaxed);
        self.counts.store(0, Ordering::Relaxed);
        self.tuples.store(0, Ordering::Relaxed);
    }
}

/// The `items` and `shops` tables
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    items: RwLock<Table<Item>>,
    shops: RwLock<Table<Shop>>,
    stats: QueryStats,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }

    pub fn items(self: &Arc<Self>) -> MemoryStore<Item> {
        MemoryStore::new(Arc::clone(self))
    }

    pub fn shops(self: &Arc<Self>) -> MemoryStore<Shop> {
        MemoryStore::new(Arc::clone(self))
    }

    /// Every row of `table` as a JSON object with unqualified keys
    pub(crate) async fn snapshot(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        match table {
            schema::item::TABLE => self.items.read().await.to_rows(),
            schema::shop::TABLE => self.shops.read().await.to_rows(),
            other => Err(StoreError::UnknownTable(other.to_string())),
        }
    }

    /// Items of a deleted shop lose their owner
    async fn detach_references(&self, table: &str, id: i64) {
        if table != schema::shop::TABLE {
            return;
        }

        let mut items = self.items.write().await;
        let mut detached = 0;
        for item in items.rows.values_mut() {
            if item.shop_id == Some(id) {
                item.shop_id = None;
                detached += 1;
            }
        }
        if detached > 0 {
            tracing::info!(shop_id = id, detached, "Items detached from deleted shop");
        }
    }
}

/// Entities stored in a [`MemoryDatabase`] table
pub trait MemoryBacked: Entity {
    fn table(db: &MemoryDatabase) -> &RwLock<Table<Self>>;
}

impl MemoryBacked for Item {
    fn table(db: &MemoryDatabase) -> &RwLock<Table<Self>> {
        &db.items
    }
}

impl MemoryBacked for Shop {
    fn table(db: &MemoryDatabase) -> &RwLock<Table<Self>> {
        &db.shops
    }
}

/// Store handle for one table of a shared [`MemoryDatabase`]
pub struct MemoryStore<T> {
    db: Arc<MemoryDatabase>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self {
            db,
            _phantom: PhantomData,
        }
    }

    pub fn database(&self) -> &Arc<MemoryDatabase> {
        &self.db
    }

    pub fn stats(&self) -> QueryStatsSnapshot {
        self.db.stats.snapshot()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.db))
    }
}

impl<T: Entity> std::fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("table", &T::table_name())
            .finish()
    }
}
