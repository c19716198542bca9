//! Trait definitions
//!
//! This module defines core traits for database operations.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::StoreError;
use crate::models::ItemWithShop;
use crate::query_builder::join::JoinType;
use crate::query_builder::pagination::{known_total, Page, PageRequest};
use crate::query_builder::projection::{Projection, Tuple};
use crate::query_builder::QueryBuilder;
use crate::traits::entity::Entity;

/// Trait that defines common database operations for all entities
#[async_trait]
pub trait EntityStore: Clone + Send + Sync + Debug {
    /// The model type that this store holds
    type Model: Entity;

    /// Insert a new row; the store assigns `id` and `created_at`
    async fn save(
        &self,
        data: <Self::Model as Entity>::New,
    ) -> Result<Self::Model, StoreError>;

    /// Insert several rows in order
    async fn save_all(
        &self,
        data: Vec<<Self::Model as Entity>::New>,
    ) -> Result<Vec<Self::Model>, StoreError> {
        let mut saved = Vec::with_capacity(data.len());
        for new in data {
            saved.push(self.save(new).await?);
        }
        Ok(saved)
    }

    /// Get an object by its ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Self::Model>, StoreError>;

    /// List all objects, ordered by ID
    async fn list_all(&self) -> Result<Vec<Self::Model>, StoreError>;

    /// Delete an object by its ID
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Count total objects of this type
    async fn count(&self) -> Result<i64, StoreError>;

    /// Find records matching query conditions
    async fn find(&self, query: QueryBuilder) -> Result<Vec<Self::Model>, StoreError>;

    /// Exactly one record: `None` for no match, `NonUniqueResult` for more than one
    async fn find_one(&self, query: QueryBuilder) -> Result<Option<Self::Model>, StoreError> {
        let mut results = self.find(query.limit(2)).await?;
        if results.len() > 1 {
            return Err(StoreError::NonUniqueResult {
                count: results.len(),
            });
        }
        Ok(results.pop())
    }

    /// First record of the ordered result, if any
    async fn find_first(&self, query: QueryBuilder) -> Result<Option<Self::Model>, StoreError> {
        let mut results = self.find(query.limit(1)).await?;
        Ok(results.pop())
    }

    /// Count records matching query conditions
    async fn count_where(&self, query: QueryBuilder) -> Result<i64, StoreError>;

    /// Rows of the query's select list (grouping and HAVING included)
    async fn fetch_tuples(&self, query: QueryBuilder) -> Result<Vec<Tuple>, StoreError>;

    /// Single tuple; same multiplicity rules as [`EntityStore::find_one`]
    async fn fetch_one_tuple(&self, query: QueryBuilder) -> Result<Option<Tuple>, StoreError> {
        let mut results = self.fetch_tuples(query.limit(2)).await?;
        if results.len() > 1 {
            return Err(StoreError::NonUniqueResult {
                count: results.len(),
            });
        }
        Ok(results.pop())
    }

    /// Rows shaped as `P`. The select list of `query` is replaced by `P::selection()`.
    async fn find_projected<P: Projection>(&self, query: QueryBuilder) -> Result<Vec<P>, StoreError> {
        let tuples = self.fetch_tuples(query.select(P::selection())).await?;
        tuples.into_iter().map(P::from_tuple).collect()
    }

    /// One page of `query`. The count query runs only when the total cannot
    /// be read off the page itself, and counts the same rows `find` returns.
    async fn find_page(
        &self,
        query: QueryBuilder,
        request: PageRequest,
    ) -> Result<Page<Self::Model>, StoreError> {
        let count_query = query
            .without_paging()
            .entity_rows(<Self::Model as Entity>::table_name());
        let content = self.find(query.page(&request)).await?;

        let total = match known_total(&request, content.len()) {
            Some(total) => total,
            None => self.count_where(count_query).await?,
        };

        Ok(Page::new(content, request, total))
    }
}

/// Item-specific operations
#[async_trait]
pub trait ItemStore: EntityStore<Model = crate::models::Item> {
    /// Load items together with their shop (fetch join). The item -> shop
    /// join of `join_type` is added to `query`.
    async fn find_with_shop(
        &self,
        query: QueryBuilder,
        join_type: JoinType,
    ) -> Result<Vec<ItemWithShop>, StoreError>;
}
