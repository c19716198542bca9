//! # shopquery
//!
//! A type-safe query layer for a small shop/item catalogue on PostgreSQL:
//! typed columns, composable predicates, joins, aggregation, projections,
//! dynamic search from optional filters and pagination that only counts
//! when the page cannot tell the total by itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shopquery::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let shopquery = ShopQuery::from_config(&config).await?;
//!     shopquery.init_schema().await?;
//!
//!     let shop = shopquery
//!         .shops()
//!         .save(Shop::builder().name("shopA").description("shop A description").build())
//!         .await?;
//!     shopquery
//!         .items()
//!         .save(Item::builder().shop(&shop).name("itemA").price(5000).stock(20).build())
//!         .await?;
//!
//!     let params = ItemSearchParams::new().price_range(5000, 8000);
//!     let page = shopquery
//!         .item_repository()
//!         .search_dynamic_page(&params, shopquery.default_page(0)?)
//!         .await?;
//!     println!("{} of {} items", page.number_of_elements(), page.total_elements());
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::{ShopQuery, search_options};
pub use errors::ShopQueryError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, SearchConfig};

// Re-export the data-access crate
pub use item_store;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
