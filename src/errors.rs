//! Error types for the shopquery crate
//!
//! This module contains all error types that can be returned by shopquery operations.

use config::ConfigError;
use item_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopQueryError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
