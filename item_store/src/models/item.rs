use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::errors::StoreError;
use crate::models::shop::Shop;
use crate::schema;
use crate::traits::Entity;

/// A stocked item, optionally owned by a shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: Option<String>,
    pub price: i32,
    pub stock: i32,
    pub shop_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn builder() -> ItemBuilder {
        ItemBuilder::default()
    }

    /// At least one unit in stock
    pub fn is_available(&self) -> bool {
        self.stock >= 1
    }
}

/// An item that has not been saved yet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub name: Option<String>,
    pub price: i32,
    pub stock: i32,
    pub shop_id: Option<i64>,
}

impl NewItem {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.price < 0 {
            return Err(StoreError::validation(format!(
                "Item price must not be negative, got {}",
                self.price
            )));
        }
        if self.stock < 0 {
            return Err(StoreError::validation(format!(
                "Item stock must not be negative, got {}",
                self.stock
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemBuilder {
    item: NewItem,
}

impl ItemBuilder {
    pub fn shop(mut self, shop: &Shop) -> Self {
        self.item.shop_id = Some(shop.id);
        self
    }

    pub fn shop_id(mut self, shop_id: i64) -> Self {
        self.item.shop_id = Some(shop_id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.item.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: i32) -> Self {
        self.item.price = price;
        self
    }

    pub fn stock(mut self, stock: i32) -> Self {
        self.item.stock = stock;
        self
    }

    pub fn build(self) -> NewItem {
        self.item
    }
}

impl Entity for Item {
    type New = NewItem;

    fn table_name() -> &'static str {
        schema::item::TABLE
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn create_table_sql() -> &'static str {
        schema::item::CREATE_TABLE_SQL
    }

    fn insert_sql() -> &'static str {
        "INSERT INTO items (name, price, stock, shop_id) \
         VALUES ($1::TEXT, $2::INTEGER, $3::INTEGER, $4::BIGINT) RETURNING *"
    }

    fn bind_insert<'q>(
        new: &NewItem,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments> {
        query
            .bind(new.name.clone())
            .bind(new.price)
            .bind(new.stock)
            .bind(new.shop_id)
    }

    fn validate(new: &NewItem) -> Result<(), StoreError> {
        new.validate()
    }

    fn materialize(new: NewItem, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            price: new.price,
            stock: new.stock,
            shop_id: new.shop_id,
            created_at,
        }
    }
}
