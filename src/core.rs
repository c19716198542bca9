//! Core shopquery functionality
//!
//! `ShopQuery` is the explicit database context: it owns the connection pool
//! built from configuration and hands out stores and repositories.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::errors::ShopQueryError;
use config::{AppConfig, DatabaseConfig, SearchConfig};
use item_store::query_builder::PageRequest;
use item_store::schema;
use item_store::search::{ItemRepository, SearchOptions};
use item_store::{Item, PgStore, Shop};

/// Database context for the shop catalogue
#[derive(Debug, Clone)]
pub struct ShopQuery {
    pool: PgPool,
    search: SearchConfig,
}

/// Repository options for a search configuration
pub fn search_options(config: &SearchConfig) -> SearchOptions {
    SearchOptions {
        max_page_size: config.max_page_size,
        reject_unfiltered: config.reject_unfiltered,
        ..SearchOptions::default()
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    let mut pool_options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connection_timeout())
        .idle_timeout(config.idle_timeout());

    // Set max lifetime if specified
    if config.max_lifetime_seconds > 0 {
        pool_options = pool_options.max_lifetime(config.max_lifetime());
    }

    pool_options
}

impl ShopQuery {
    /// Connect with the given database settings and default search settings
    pub async fn new(config: DatabaseConfig) -> Result<Self, ShopQueryError> {
        let pool = pool_options(&config)
            .connect(&config.connection_string())
            .await?;
        Ok(Self::from_pool(pool, SearchConfig::default()))
    }

    /// Connect using a loaded [`AppConfig`]
    pub async fn from_config(config: &AppConfig) -> Result<Self, ShopQueryError> {
        config.validate()?;
        let pool = pool_options(&config.database)
            .connect(&config.database.connection_string())
            .await?;

        tracing::info!(
            host = %config.database.host,
            database = %config.database.database,
            "Connected to PostgreSQL"
        );
        Ok(Self::from_pool(pool, config.search.clone()))
    }

    /// Build the pool without opening a connection; the first query connects
    pub fn connect_lazy(config: &AppConfig) -> Result<Self, ShopQueryError> {
        config.validate()?;
        let pool = pool_options(&config.database).connect_lazy(&config.database.connection_string())?;
        Ok(Self::from_pool(pool, config.search.clone()))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool, search: SearchConfig) -> Self {
        Self { pool, search }
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    pub fn items(&self) -> PgStore<Item> {
        PgStore::new(self.pool.clone())
    }

    pub fn shops(&self) -> PgStore<Shop> {
        PgStore::new(self.pool.clone())
    }

    /// Dynamic item search configured from the `[search]` settings
    pub fn item_repository(&self) -> ItemRepository<PgStore<Item>> {
        ItemRepository::with_options(self.items(), search_options(&self.search))
    }

    /// Page `page` at the configured default page size
    pub fn default_page(&self, page: i64) -> Result<PageRequest, ShopQueryError> {
        Ok(PageRequest::of(page, self.search.default_page_size)?)
    }

    /// Create the `shops` and `items` tables when missing
    pub async fn init_schema(&self) -> Result<(), ShopQueryError> {
        for statement in schema::create_statements() {
            crate::debug_log!("[SCHEMA] {}", statement);
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Schema initialized");
        Ok(())
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), ShopQueryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
