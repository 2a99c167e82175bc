//! castscore adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `llm`: rubric scorer adapters (OpenAI-compatible, stub, disabled)
//! - `store`: SQLite and in-memory score stores
//! - `hub`: Farcaster hub cast source
//! - `article`: article metadata fetcher

pub mod article;
pub mod hub;
pub mod llm;

mod store_memory;
mod store_sqlite;

/// Re-exports for score store adapters
pub mod store {
    pub use crate::store_memory::InMemoryScoreStore;
    pub use crate::store_sqlite::{CastTable, SqliteScoreStore};
}
