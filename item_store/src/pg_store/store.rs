//! Generic store implementation

use super::PgStore;
use crate::errors::StoreError;
use crate::query_builder::projection::Tuple;
use crate::query_builder::{QueryBuilder, SqlGenerator};
use crate::traits::{Entity, EntityStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::Row;

#[async_trait]
impl<T: Entity> EntityStore for PgStore<T> {
    type Model = T;

    async fn save(&self, data: T::New) -> Result<T, StoreError> {
        T::validate(&data)?;

        let saved = T::bind_insert(&data, sqlx::query_as::<_, T>(T::insert_sql()))
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "save", e))?;

        tracing::info!(table = T::table_name(), id = saved.id(), "Row saved");
        Ok(saved)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<T>, StoreError> {
        let sql = T::get_by_id_sql();
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "get_by_id", e))
    }

    async fn list_all(&self) -> Result<Vec<T>, StoreError> {
        let sql = T::list_all_sql();
        sqlx::query_as::<_, T>(&sql)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "list_all", e))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let sql = T::delete_by_id_sql();
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "delete", e))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(table = T::table_name(), id, "Row deleted");
        }
        Ok(deleted)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let sql = T::count_all_sql();
        let row = sqlx::query(&sql)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "count", e))?;

        row.try_get("total")
            .map_err(|e| StoreError::database_operation(T::table_name(), "count", e))
    }

    async fn find(&self, query: QueryBuilder) -> Result<Vec<T>, StoreError> {
        let (sql, params) = SqlGenerator::select_statement(T::table_name(), &query);
        crate::debug_log!("[FIND] SQL: {}", sql);
        crate::debug_log!("[FIND] params count: {}", params.len());

        let mut sqlx_query = sqlx::query_as::<_, T>(&sql);
        for param in params {
            sqlx_query = bind_json_param!(sqlx_query, param);
        }

        sqlx_query
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "find", e))
    }

    async fn count_where(&self, query: QueryBuilder) -> Result<i64, StoreError> {
        let (sql, params) = SqlGenerator::count_statement(T::table_name(), &query);
        crate::debug_log!("[COUNT_WHERE] SQL: {}", sql);

        let mut sqlx_query = sqlx::query(&sql);
        for param in params {
            sqlx_query = bind_json_param!(sqlx_query, param);
        }

        let row = sqlx_query
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "count_where", e))?;

        row.try_get("total")
            .map_err(|e| StoreError::database_operation(T::table_name(), "count_where", e))
    }

    async fn fetch_tuples(&self, query: QueryBuilder) -> Result<Vec<Tuple>, StoreError> {
        let (sql, params) = SqlGenerator::tuple_statement(T::table_name(), &query);
        crate::debug_log!("[FETCH_TUPLES] SQL: {}", sql);

        let mut sqlx_query = sqlx::query(&sql);
        for param in params {
            sqlx_query = bind_json_param!(sqlx_query, param);
        }

        let rows = sqlx_query
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "fetch_tuples", e))?;

        rows.iter()
            .map(|row| {
                let Json(value): Json<Value> = row.try_get("row").map_err(|e| {
                    StoreError::database_operation(T::table_name(), "fetch_tuples", e)
                })?;
                let object: Map<String, Value> = serde_json::from_value(value)?;
                Ok(Tuple::from_selection(query.selection(), object))
            })
            .collect()
    }
}
