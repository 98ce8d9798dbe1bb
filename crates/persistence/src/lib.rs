//! # crm-persistence
//!
//! Record persistence core for the CRM administration service.
//!
//! This crate stores the four record kinds the service manages (teachers,
//! cabinets, subscriptions and user accounts) and gives every one of them the
//! same guarantees:
//!
//! - **Optimistic concurrency**: every record carries an integer version;
//!   writes are conditional on the version the caller last read, and a lost
//!   race is reported as [`StoreError::EditConflict`], never a silent
//!   overwrite.
//! - **Validation before storage**: field rules accumulate into a
//!   field-to-message map; an invalid record never reaches the database.
//! - **Paged listing**: safelisted sorting, window-counted totals and
//!   pagination metadata in a single statement.
//! - **Deadlines**: every operation is bounded; an expired operation is
//!   interrupted and reported as [`StoreError::Timeout`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              core::{create, patch, register_user}    │
//! │                 validate ─► merge ─► write           │
//! ├──────────────────────────────────────────────────────┤
//! │        ResourceStore<R>  /  UserStore                │
//! ├──────────────────────────────────────────────────────┤
//! │   SqliteStore<R>  ─►  SqliteBackend (r2d2 pool,      │
//! │                        deadlines, schema, FTS5)      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use crm_persistence::backends::sqlite::SqliteBackend;
//! use crm_persistence::core::{self, ResourceStore};
//! use crm_persistence::models::Models;
//! use crm_persistence::types::{Cabinet, CabinetPatch, ListParams};
//!
//! # async fn example() -> Result<(), crm_persistence::StoreError> {
//! let backend = SqliteBackend::open("./data/crm.db")?;
//! backend.init_schema()?;
//! let models = Models::new(backend);
//!
//! let cabinet = core::create(&models.cabinets, Cabinet::new("Room 101", "Main street 1")).await?;
//!
//! let renamed = core::patch(
//!     &models.cabinets,
//!     cabinet.meta.id,
//!     CabinetPatch { name: Some("Room 102".to_string()), ..Default::default() },
//! )
//! .await?;
//! assert_eq!(renamed.meta.version, 2);
//!
//! let page = models.cabinets.list(&(), &ListParams::default().with_sort("-name")).await?;
//! assert_eq!(page.metadata.total_records, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`StoreResult`]. Callers map the error kinds to
//! their own transport statuses:
//!
//! ```
//! use crm_persistence::StoreError;
//!
//! fn status(err: &StoreError) -> u16 {
//!     match err {
//!         StoreError::NotFound { .. } => 404,
//!         StoreError::EditConflict { .. } => 409,
//!         StoreError::ValidationFailed(_) => 422,
//!         StoreError::DuplicateKey { .. } => 409,
//!         StoreError::Timeout { .. } => 503,
//!         StoreError::Unknown { .. } => 500,
//!     }
//! }
//! # assert_eq!(status(&StoreError::Timeout { message: String::new() }), 503);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod credentials;
pub mod error;
#[cfg(feature = "sqlite")]
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{StoreError, StoreResult};
pub use types::{ListParams, Metadata, Page, RecordMeta};

// Re-export core traits
pub use crate::core::{Patch, Record, ResourceStore, UserStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
