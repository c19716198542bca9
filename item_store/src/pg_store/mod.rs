//! PostgreSQL store
//!
//! Executes [`crate::QueryBuilder`] queries through `sqlx`.

// Shared parameter binding: every query value travels as JSON and is bound
// with the closest PostgreSQL type. Strings are always text; timestamp
// conditions carry their own cast in the SQL.
macro_rules! bind_json_param {
    ($query:expr, $param:expr) => {
        match $param {
            serde_json::Value::String(s) => $query.bind(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                        $query.bind(i as i32)
                    } else {
                        $query.bind(i)
                    }
                } else if let Some(f) = n.as_f64() {
                    $query.bind(f)
                } else {
                    $query.bind(n.to_string())
                }
            }
            serde_json::Value::Bool(b) => $query.bind(b),
            serde_json::Value::Null => $query.bind(Option::<String>::None),
            other => $query.bind(other.to_string()),
        }
    };
}

mod fetch_join;
mod store;

use crate::errors::StoreError;
use crate::traits::Entity;
use crate::DbPool;
use std::marker::PhantomData;

/// Database store for one entity type
#[derive(Clone)]
pub struct PgStore<T: Entity> {
    pub(crate) db_pool: DbPool,
    _phantom: PhantomData<T>,
}

impl<T: Entity> std::fmt::Debug for PgStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("table", &T::table_name())
            .finish()
    }
}

impl<T: Entity> PgStore<T> {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            db_pool,
            _phantom: PhantomData,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.db_pool
    }

    /// Run `CREATE TABLE IF NOT EXISTS` for this entity
    pub async fn create_table(&self) -> Result<(), StoreError> {
        sqlx::query(T::create_table_sql())
            .execute(&self.db_pool)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "create_table", e))?;
        Ok(())
    }
}
