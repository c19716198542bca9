//! Entity metadata
//!
//! What a store needs to know about a stored type: its table, its key, how
//! to insert it and how to build it from an unsaved value.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::Postgres;
use std::fmt::Debug;

use crate::errors::StoreError;

/// A row type of one table, keyed by a `BIGSERIAL` id
pub trait Entity:
    Clone
    + Send
    + Sync
    + Debug
    + Serialize
    + DeserializeOwned
    + Unpin
    + 'static
    + for<'r> sqlx::FromRow<'r, PgRow>
{
    /// The unsaved value: everything except `id` and `created_at`
    type New: Clone + Send + Sync + Debug + 'static;

    /// The table name in the database
    fn table_name() -> &'static str;

    /// Primary key of this row
    fn id(&self) -> i64;

    /// Generate CREATE TABLE SQL statement
    fn create_table_sql() -> &'static str;

    /// `INSERT ... RETURNING *`, one placeholder per field of [`Entity::New`]
    fn insert_sql() -> &'static str;

    /// Bind the fields of `new` in placeholder order
    fn bind_insert<'q>(
        new: &Self::New,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments>;

    /// Checked before every save
    fn validate(_new: &Self::New) -> Result<(), StoreError> {
        Ok(())
    }

    /// Build the stored row from an unsaved value and the generated columns
    fn materialize(new: Self::New, id: i64, created_at: DateTime<Utc>) -> Self;

    /// `SELECT * ... WHERE id = $1`
    fn get_by_id_sql() -> String {
        format!("SELECT * FROM {} WHERE id = $1", Self::table_name())
    }

    fn list_all_sql() -> String {
        format!("SELECT * FROM {} ORDER BY id", Self::table_name())
    }

    fn delete_by_id_sql() -> String {
        format!("DELETE FROM {} WHERE id = $1", Self::table_name())
    }

    fn count_all_sql() -> String {
        format!("SELECT COUNT(*) AS total FROM {}", Self::table_name())
    }
}
