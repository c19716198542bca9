//! Dynamic item search
//!
//! Optional filters become optional predicates, which are folded into a
//! single WHERE clause and run through any [`crate::ItemStore`].

mod params;
pub mod predicates;
mod repository;

pub use params::ItemSearchParams;
pub use repository::{CombineStrategy, ItemRepository, SearchOptions};
