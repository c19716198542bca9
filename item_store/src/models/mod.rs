//! Entities and result shapes

pub mod dto;
pub mod item;
pub mod shop;

use serde::{Deserialize, Serialize};

pub use dto::{ItemDto, ItemDtoProj};
pub use item::{Item, ItemBuilder, NewItem};
pub use shop::{NewShop, Shop, ShopBuilder};

/// An item with its shop loaded by a fetch join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemWithShop {
    pub item: Item,
    pub shop: Option<Shop>,
}

impl ItemWithShop {
    /// Whether the shop row was loaded
    pub fn is_shop_loaded(&self) -> bool {
        self.shop.is_some()
    }
}
