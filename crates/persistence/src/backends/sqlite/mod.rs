//! SQLite backend implementation.
//!
//! This module provides the SQLite implementation of [`ResourceStore`] for
//! every record kind. It supports both in-memory databases (great for
//! testing) and file-based databases.
//!
//! # Features
//!
//! - In-memory and file-based modes over an r2d2 connection pool
//! - Conditional updates in a single `UPDATE ... RETURNING` statement
//! - Window-counted pagination (`COUNT(*) OVER()`)
//! - FTS5 token search over teacher names
//! - Per-operation deadlines that interrupt the running statement
//!
//! # Example
//!
//! ```no_run
//! use crm_persistence::backends::sqlite::{SqliteBackend, SqliteStore};
//! use crm_persistence::core::ResourceStore;
//! use crm_persistence::types::Cabinet;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::open("./data/crm.db")?;
//! backend.init_schema()?;
//!
//! let cabinets: SqliteStore<Cabinet> = SqliteStore::new(backend.clone());
//! let cabinet = cabinets.insert(Cabinet::new("Room 101", "Main street 1")).await?;
//! assert_eq!(cabinet.meta.version, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! Each record kind has its own table:
//!
//! ```sql
//! CREATE TABLE cabinets (
//!     id TEXT PRIMARY KEY NOT NULL,         -- UUID
//!     version INTEGER NOT NULL DEFAULT 1,   -- concurrency token
//!     created_at TEXT NOT NULL,             -- RFC 3339, microseconds
//!     updated_at TEXT NOT NULL,
//!     name TEXT NOT NULL,
//!     address TEXT NOT NULL DEFAULT ''
//! );
//! ```
//!
//! [`ResourceStore`]: crate::core::ResourceStore

mod backend;
mod cabinets;
pub mod query_builder;
mod schema;
mod store;
mod subscriptions;
mod teachers;
mod users;

pub use backend::SqliteBackend;
pub use schema::SCHEMA_VERSION;
pub use store::{SqliteRecord, SqliteStore};
