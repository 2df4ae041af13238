//! Infrastructure layer for Parlor.
//!
//! Contains implementations of the repository traits defined in `parlor-core`
//! (SQLite storage with embedded migrations) and the configuration loader.

pub mod config;
pub mod sqlite;
