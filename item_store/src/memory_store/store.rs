use async_trait::async_trait;

use super::engine;
use super::{MemoryBacked, MemoryStore};
use crate::errors::StoreError;
use crate::models::{Item, ItemWithShop, Shop};
use crate::query_builder::projection::Tuple;
use crate::query_builder::{JoinType, QueryBuilder};
use crate::schema;
use crate::traits::{Entity, EntityStore, ItemStore};

#[async_trait]
impl<T: MemoryBacked> EntityStore for MemoryStore<T> {
    type Model = T;

    async fn save(&self, data: T::New) -> Result<T, StoreError> {
        T::validate(&data)?;
        let saved = T::table(&self.db).write().await.insert(data);
        tracing::info!(table = T::table_name(), id = saved.id(), "Row saved");
        Ok(saved)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<T>, StoreError> {
        Ok(T::table(&self.db).read().await.rows.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<T>, StoreError> {
        Ok(T::table(&self.db).read().await.rows.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = T::table(&self.db).write().await.rows.remove(&id).is_some();
        if removed {
            self.db.detach_references(T::table_name(), id).await;
            tracing::info!(table = T::table_name(), id, "Row deleted");
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(T::table(&self.db).read().await.rows.len() as i64)
    }

    async fn find(&self, query: QueryBuilder) -> Result<Vec<T>, StoreError> {
        self.db.stats.record_select();
        let query = query.entity_rows(T::table_name());
        engine::select_entities(&self.db, T::table_name(), &query).await
    }

    async fn count_where(&self, query: QueryBuilder) -> Result<i64, StoreError> {
        self.db.stats.record_count();
        let rows = engine::relation(&self.db, T::table_name(), &query).await?;
        Ok(rows.len() as i64)
    }

    async fn fetch_tuples(&self, query: QueryBuilder) -> Result<Vec<Tuple>, StoreError> {
        self.db.stats.record_tuples();
        engine::select_tuples(&self.db, T::table_name(), &query).await
    }
}

#[async_trait]
impl ItemStore for MemoryStore<Item> {
    async fn find_with_shop(
        &self,
        query: QueryBuilder,
        join_type: JoinType,
    ) -> Result<Vec<ItemWithShop>, StoreError> {
        self.db.stats.record_select();

        let join = schema::item::shop_join(join_type);
        let fetched_ref = join.table_ref().to_string();
        let query = query.join(join).entity_rows(Item::table_name());

        let rows = engine::select_rows(&self.db, Item::table_name(), &query).await?;
        let mut loaded = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(item) = engine::extract::<Item>(Item::table_name(), row)? {
                let shop = engine::extract::<Shop>(&fetched_ref, row)?;
                loaded.push(ItemWithShop { item, shop });
            }
        }
        Ok(loaded)
    }
}
