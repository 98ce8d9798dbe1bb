//! Core storage traits and write flows.
//!
//! This module provides the backend-agnostic layer of the crate:
//!
//! - [`Record`] - What every persisted record kind exposes to a store
//! - [`Patch`] - Partial updates merged into a fetched record
//! - [`ResourceStore`] - CRUD with optimistic concurrency control
//! - [`UserStore`] - Lookup of users by email
//! - [`create`], [`patch`], [`register_user`] - Validated write flows
//!
//! # Write Flow
//!
//! Stores never accept partial input. An edit is always a fetch, an in-memory
//! merge, a re-validation and a conditional write:
//!
//! ```text
//! get(id) ──► Patch::apply ──► Validate ──► update(record)
//!                                  │               │
//!                          ValidationFailed   EditConflict
//! ```

mod flow;
mod record;
mod storage;

pub use flow::{create, patch, register_user};
pub use record::{Patch, Record};
pub use storage::{ResourceStore, UserStore};
