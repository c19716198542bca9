//! Optional item predicates
//!
//! Each function returns `None` when its input is absent, so the result can
//! go straight into [`crate::QueryBuilder::where_all`] or
//! [`crate::ConditionBuilder::and_opt`].

use crate::query_builder::QueryFilter;
use crate::schema::item;

pub fn name_equals(name: Option<&str>) -> Option<QueryFilter> {
    name.map(|name| item::NAME.eq(name))
}

/// Inclusive price range; a missing bound leaves that side open
pub fn price_between(floor: Option<i32>, ceil: Option<i32>) -> Option<QueryFilter> {
    match (floor, ceil) {
        (None, None) => None,
        (Some(floor), None) => price_gte(Some(floor)),
        (None, Some(ceil)) => price_lte(Some(ceil)),
        (Some(floor), Some(ceil)) => Some(item::PRICE.between(floor, ceil)),
    }
}

pub fn price_gte(floor: Option<i32>) -> Option<QueryFilter> {
    floor.map(|floor| item::PRICE.gte(floor))
}

pub fn price_lte(ceil: Option<i32>) -> Option<QueryFilter> {
    ceil.map(|ceil| item::PRICE.lte(ceil))
}

pub fn price_equals(price: Option<i32>) -> Option<QueryFilter> {
    price.map(|price| item::PRICE.eq(price))
}

pub fn stock_equals(stock: Option<i32>) -> Option<QueryFilter> {
    stock.map(|stock| item::STOCK.eq(stock))
}

/// `Some(true)` keeps items in stock. `Some(false)` and `None` both filter nothing.
pub fn availability(flag: Option<bool>) -> Option<QueryFilter> {
    match flag {
        Some(true) => Some(item::STOCK.gte(1)),
        Some(false) | None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_inputs_give_no_predicate() {
        assert_eq!(name_equals(None), None);
        assert_eq!(price_between(None, None), None);
        assert_eq!(price_equals(None), None);
        assert_eq!(stock_equals(None), None);
        assert_eq!(availability(None), None);
    }

    #[test]
    fn test_price_between_one_sided() {
        assert_eq!(
            price_between(Some(5000), None),
            Some(QueryFilter::gte("items.price", json!(5000)))
        );
        assert_eq!(
            price_between(None, Some(6000)),
            Some(QueryFilter::lte("items.price", json!(6000)))
        );
        assert_eq!(
            price_between(Some(5000), Some(6000)),
            Some(QueryFilter::between("items.price", json!(5000), json!(6000)))
        );
    }

    #[test]
    fn test_availability_false_aliases_absent() {
        assert_eq!(availability(Some(false)), availability(None));
        assert_eq!(
            availability(Some(true)),
            Some(QueryFilter::gte("items.stock", json!(1)))
        );
    }

    #[test]
    fn test_name_equals_binds_value() {
        assert_eq!(
            name_equals(Some("itemA")),
            Some(QueryFilter::eq("items.name", json!("itemA")))
        );
    }
}
