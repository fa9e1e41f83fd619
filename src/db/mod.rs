//! Database module
//!
//! SQLite pool plus the schema for food logs, hydration and saved meal plans.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
