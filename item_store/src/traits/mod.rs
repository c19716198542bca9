//! Trait definitions
//!
//! This module defines the entity metadata and store traits shared by the
//! PostgreSQL and in-memory back-ends.

pub mod core;
pub mod entity;

pub use core::{EntityStore, ItemStore};
pub use entity::Entity;
