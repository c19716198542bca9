//! Demo catalogue shared by the in-memory store tests

use std::sync::Arc;

use crate::memory_store::{MemoryDatabase, MemoryStore};
use crate::models::{Item, Shop};
use crate::traits::EntityStore;

pub(crate) struct Demo {
    pub db: Arc<MemoryDatabase>,
    pub items: MemoryStore<Item>,
    pub shops: MemoryStore<Shop>,
    pub shop_a: Shop,
    pub shop_b: Shop,
    pub shop_c: Shop,
}

/// Three shops (shopC owns nothing) and six items:
///
/// | name   | price | stock | shop  |
/// |--------|-------|-------|-------|
/// | itemA  | 5000  | a     | shopA |
/// | itemB  | 6000  | b     | shopA |
/// | itemC  | 8000  | c     | shopB |
/// | itemD  | 10000 | d     | shopB |
/// | itemE  | 5500  | e     |       |
/// | (none) | 7500  | f     |       |
async fn seed_with_stock(stock: [i32; 6]) -> Demo {
    let db = MemoryDatabase::shared();
    let items = db.items();
    let shops = db.shops();

    let shop_a = shops
        .save(Shop::builder().name("shopA").description("shop A description").build())
        .await
        .unwrap();
    let shop_b = shops
        .save(Shop::builder().name("shopB").description("shop B description").build())
        .await
        .unwrap();
    let shop_c = shops
        .save(Shop::builder().name("shopC").description("shop C description").build())
        .await
        .unwrap();

    items
        .save_all(vec![
            Item::builder().shop(&shop_a).name("itemA").price(5000).stock(stock[0]).build(),
            Item::builder().shop(&shop_a).name("itemB").price(6000).stock(stock[1]).build(),
            Item::builder().shop(&shop_b).name("itemC").price(8000).stock(stock[2]).build(),
            Item::builder().shop(&shop_b).name("itemD").price(10000).stock(stock[3]).build(),
            Item::builder().name("itemE").price(5500).stock(stock[4]).build(),
            Item::builder().price(7500).stock(stock[5]).build(),
        ])
        .await
        .unwrap();

    db.stats().reset();

    Demo {
        db,
        items,
        shops,
        shop_a,
        shop_b,
        shop_c,
    }
}

/// Stock 20, 30, 40, 50, 10, 25
pub(crate) async fn seed() -> Demo {
    seed_with_stock([20, 30, 40, 50, 10, 25]).await
}

/// Stock 20, 0, 0, 0, 10, 25: only itemA, itemE and the unnamed item are available
pub(crate) async fn seed_for_search() -> Demo {
    seed_with_stock([20, 0, 0, 0, 10, 25]).await
}

/// Names in result order, `None` for the unnamed item
pub(crate) fn names(items: &[Item]) -> Vec<Option<&str>> {
    items.iter().map(|item| item.name.as_deref()).collect()
}
