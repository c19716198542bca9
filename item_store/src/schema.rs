//! Table schema
//!
//! Typed column handles and DDL for the `items` and `shops` tables.

/// `items` table
pub mod item {
    use chrono::{DateTime, Utc};

    use crate::query_builder::column::Column;
    use crate::query_builder::join::{JoinClause, JoinType};

    pub const TABLE: &str = "items";

    pub const ID: Column<i64> = Column::new(TABLE, "id", "items.id");
    pub const NAME: Column<String> = Column::new(TABLE, "name", "items.name");
    pub const PRICE: Column<i32> = Column::new(TABLE, "price", "items.price");
    pub const STOCK: Column<i32> = Column::new(TABLE, "stock", "items.stock");
    pub const SHOP_ID: Column<i64> = Column::new(TABLE, "shop_id", "items.shop_id");
    pub const CREATED_AT: Column<DateTime<Utc>> =
        Column::new(TABLE, "created_at", "items.created_at");

    /// The item -> shop relation
    pub fn shop_join(join_type: JoinType) -> JoinClause {
        JoinClause::new_on(join_type, super::shop::TABLE, SHOP_ID.qualified(), super::shop::ID.qualified())
    }

    pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS items (
        id BIGSERIAL PRIMARY KEY,
        name TEXT,
        price INTEGER NOT NULL CHECK (price >= 0),
        stock INTEGER NOT NULL CHECK (stock >= 0),
        shop_id BIGINT REFERENCES shops(id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )";
}

/// `shops` table
pub mod shop {
    use chrono::{DateTime, Utc};

    use crate::query_builder::column::Column;

    pub const TABLE: &str = "shops";

    pub const ID: Column<i64> = Column::new(TABLE, "id", "shops.id");
    pub const NAME: Column<String> = Column::new(TABLE, "name", "shops.name");
    pub const DESCRIPTION: Column<String> = Column::new(TABLE, "description", "shops.description");
    pub const CREATED_AT: Column<DateTime<Utc>> =
        Column::new(TABLE, "created_at", "shops.created_at");

    pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS shops (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )";
}

/// DDL in dependency order
pub fn create_statements() -> [&'static str; 2] {
    [shop::CREATE_TABLE_SQL, item::CREATE_TABLE_SQL]
}
