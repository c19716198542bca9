//! Convenience re-exports for common shopquery usage
//!
//! # Example
//!
//! ```rust
//! use shopquery::prelude::*;
//!
//! let query = QueryBuilder::new()
//!     .filter(item::PRICE.between(5000, 8000))
//!     .order_by(item::NAME.asc().nulls_first());
//! assert!(!query.is_unfiltered());
//! ```

// Core shopquery components
pub use crate::core::{ShopQuery, search_options};
pub use crate::errors::ShopQueryError;

// Re-export centralized config
pub use config::{AppConfig, ConfigError, DatabaseConfig, SearchConfig};

// Re-export commonly used item-store types for convenience
pub use item_store::prelude::*;

// Common external dependencies
pub use serde_json::{self, json};
pub use sqlx;
pub use tokio;
