//! Projection shapes
//!
//! `items.price` is surfaced as `cost` in both shapes.

use serde::{Deserialize, Serialize};

use crate::models::Item;
use crate::query_builder::aggregation::SelectField;
use crate::query_builder::projection::Projection;
use crate::schema::item;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDto {
    pub name: Option<String>,
    pub cost: i32,
    pub stock: i32,
}

impl ItemDto {
    pub fn new(name: Option<String>, cost: i32, stock: i32) -> Self {
        Self { name, cost, stock }
    }

    pub fn from_entity(entity: &Item) -> Self {
        Self::new(entity.name.clone(), entity.price, entity.stock)
    }
}

impl Projection for ItemDto {
    fn selection() -> Vec<SelectField> {
        vec![
            item::NAME.as_("name"),
            item::PRICE.as_("cost"),
            item::STOCK.as_("stock"),
        ]
    }
}

/// Like [`ItemDto`] plus `total_cost = cost * stock`, computed on construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ItemDto")]
pub struct ItemDtoProj {
    pub name: Option<String>,
    pub cost: i32,
    pub stock: i32,
    pub total_cost: i64,
}

impl ItemDtoProj {
    pub fn new(name: Option<String>, cost: i32, stock: i32) -> Self {
        Self {
            name,
            cost,
            stock,
            total_cost: i64::from(cost) * i64::from(stock),
        }
    }
}

impl From<ItemDto> for ItemDtoProj {
    fn from(dto: ItemDto) -> Self {
        Self::new(dto.name, dto.cost, dto.stock)
    }
}

impl Projection for ItemDtoProj {
    fn selection() -> Vec<SelectField> {
        ItemDto::selection()
    }
}
