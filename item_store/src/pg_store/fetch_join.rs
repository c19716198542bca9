use super::PgStore;
use crate::errors::StoreError;
use crate::models::{Item, ItemWithShop, Shop};
use crate::query_builder::{JoinType, QueryBuilder, SqlGenerator};
use crate::schema;
use crate::traits::{Entity, ItemStore};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::Row;

#[async_trait]
impl ItemStore for PgStore<Item> {
    async fn find_with_shop(
        &self,
        query: QueryBuilder,
        join_type: JoinType,
    ) -> Result<Vec<ItemWithShop>, StoreError> {
        let join = schema::item::shop_join(join_type);
        let fetched_ref = join.table_ref().to_string();
        let query = query.join(join);

        let (sql, params) = SqlGenerator::fetch_join_statement(
            Item::table_name(),
            &fetched_ref,
            schema::shop::ID.name(),
            &query,
        );
        crate::debug_log!("[FIND_WITH_SHOP] SQL: {}", sql);

        let mut sqlx_query = sqlx::query(&sql);
        for param in params {
            sqlx_query = bind_json_param!(sqlx_query, param);
        }

        let rows = sqlx_query
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(Item::table_name(), "find_with_shop", e))?;

        let mut loaded = Vec::with_capacity(rows.len());
        for row in &rows {
            let base: Option<Json<Item>> = row.try_get("base").map_err(|e| {
                StoreError::database_operation(Item::table_name(), "find_with_shop", e)
            })?;
            let fetched: Option<Json<Shop>> = row.try_get("fetched").map_err(|e| {
                StoreError::database_operation(Item::table_name(), "find_with_shop", e)
            })?;

            // RIGHT and FULL joins yield shop rows without an item
            if let Some(Json(item)) = base {
                loaded.push(ItemWithShop {
                    item,
                    shop: fetched.map(|Json(shop)| shop),
                });
            }
        }
        Ok(loaded)
    }
}
