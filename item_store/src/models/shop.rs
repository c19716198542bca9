use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::errors::StoreError;
use crate::schema;
use crate::traits::Entity;

/// A shop owning zero or more items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Shop {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Shop {
    pub fn builder() -> ShopBuilder {
        ShopBuilder::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewShop {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ShopBuilder {
    shop: NewShop,
}

impl ShopBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.shop.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.shop.description = description.into();
        self
    }

    pub fn build(self) -> NewShop {
        self.shop
    }
}

impl Entity for Shop {
    type New = NewShop;

    fn table_name() -> &'static str {
        schema::shop::TABLE
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn create_table_sql() -> &'static str {
        schema::shop::CREATE_TABLE_SQL
    }

    fn insert_sql() -> &'static str {
        "INSERT INTO shops (name, description) VALUES ($1::TEXT, $2::TEXT) RETURNING *"
    }

    fn bind_insert<'q>(
        new: &NewShop,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments> {
        query
            .bind(new.name.clone())
            .bind(new.description.clone())
    }

    fn validate(new: &NewShop) -> Result<(), StoreError> {
        if new.name.trim().is_empty() {
            return Err(StoreError::validation("Shop name must not be empty"));
        }
        Ok(())
    }

    fn materialize(new: NewShop, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            created_at,
        }
    }
}
