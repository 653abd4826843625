//! SQLite 持久化存储

mod adapter;
mod operations;
mod schema;
mod utils;

pub use adapter::SqliteStore;
