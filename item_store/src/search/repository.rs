use serde::{Deserialize, Serialize};

use super::params::ItemSearchParams;
use super::predicates::{availability, name_equals, price_between, stock_equals};
use crate::errors::StoreError;
use crate::models::Item;
use crate::query_builder::{ConditionBuilder, Page, PageRequest, QueryBuilder};
use crate::schema::item;
use crate::traits::ItemStore;

/// How the optional predicates are folded into one WHERE clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineStrategy {
    /// AND each present predicate into a [`ConditionBuilder`]
    Accumulate,
    /// Hand the full optional list to [`QueryBuilder::where_all`]
    #[default]
    WhereList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub max_page_size: i64,
    pub reject_unfiltered: bool,
    pub strategy: CombineStrategy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            reject_unfiltered: false,
            strategy: CombineStrategy::default(),
        }
    }
}

/// Dynamic item search over any [`ItemStore`]
#[derive(Debug, Clone)]
pub struct ItemRepository<S> {
    store: S,
    options: SearchOptions,
}

impl<S: ItemStore> ItemRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, SearchOptions::default())
    }

    pub fn with_options(store: S, options: SearchOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Filtered query for `params`, ordered by id for stable pages
    pub fn build_query(&self, params: &ItemSearchParams) -> QueryBuilder {
        let predicates = [
            name_equals(params.name.as_deref()),
            price_between(params.price_floor, params.price_ceil),
            stock_equals(params.stock),
            availability(params.available_only),
        ];

        let query = match self.options.strategy {
            CombineStrategy::Accumulate => {
                let mut builder = ConditionBuilder::new();
                for predicate in predicates {
                    builder.and_opt(predicate);
                }
                QueryBuilder::new().where_builder(&builder)
            }
            CombineStrategy::WhereList => QueryBuilder::new().where_all(predicates),
        };

        query.order_by(item::ID.asc())
    }

    fn check_filtered(&self, params: &ItemSearchParams) -> Result<(), StoreError> {
        if self.options.reject_unfiltered && params.is_unfiltered() {
            return Err(StoreError::validation("Unfiltered item search is disabled"));
        }
        Ok(())
    }

    /// Every item matching `params`
    pub async fn search_dynamic(&self, params: &ItemSearchParams) -> Result<Vec<Item>, StoreError> {
        tracing::info!(?params, "Dynamic item search");
        self.check_filtered(params)?;

        let query = self.build_query(params);
        crate::debug_log!("[SEARCH] {} conditions", query.conditions().len());
        self.store.find(query).await
    }

    /// One page of the items matching `params`. The page size is capped at
    /// `max_page_size`; the count query runs only when the page cannot tell
    /// the total by itself.
    pub async fn search_dynamic_page(
        &self,
        params: &ItemSearchParams,
        request: PageRequest,
    ) -> Result<Page<Item>, StoreError> {
        tracing::info!(?params, ?request, "Dynamic item search (paged)");
        self.check_filtered(params)?;

        let request = request.clamped(self.options.max_page_size);
        self.store.find_page(self.build_query(params), request).await
    }
}
