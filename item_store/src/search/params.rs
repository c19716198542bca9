use serde::{Deserialize, Serialize};

/// Optional filters for a dynamic item search. Every combination is legal;
/// all absent means "every item".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSearchParams {
    pub name: Option<String>,
    pub price_floor: Option<i32>,
    pub price_ceil: Option<i32>,
    pub stock: Option<i32>,
    pub available_only: Option<bool>,
}

impl ItemSearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price_floor(mut self, floor: i32) -> Self {
        self.price_floor = Some(floor);
        self
    }

    pub fn price_ceil(mut self, ceil: i32) -> Self {
        self.price_ceil = Some(ceil);
        self
    }

    /// Both price bounds, inclusive
    pub fn price_range(self, floor: i32, ceil: i32) -> Self {
        self.price_floor(floor).price_ceil(ceil)
    }

    pub fn stock(mut self, stock: i32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn available_only(mut self, flag: bool) -> Self {
        self.available_only = Some(flag);
        self
    }

    /// True when no filter is present
    pub fn is_unfiltered(&self) -> bool {
        self.name.is_none()
            && self.price_floor.is_none()
            && self.price_ceil.is_none()
            && self.stock.is_none()
            && self.available_only.is_none()
    }
}
