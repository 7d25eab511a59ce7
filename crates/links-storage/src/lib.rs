//! Links Storage Layer
//!
//! SQLite-based persistence for aliases, usage logs, devices and settings.
//! The resolver reads through this layer; it never sees SQL.

mod database;
mod error;
mod migrations;

pub use database::{like_prefix, now_timestamp, parse_timestamp, Database};
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
