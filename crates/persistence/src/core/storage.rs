//! Core resource storage trait.
//!
//! This module defines the [`ResourceStore`] trait, the CRUD protocol every
//! record kind is persisted through, and [`UserStore`], its extension for
//! looking users up by email.

use async_trait::async_trait;
use uuid::Uuid;

use super::Record;
use crate::error::StoreResult;
use crate::types::{ListParams, Page, User};

/// CRUD storage for one record kind with optimistic concurrency control.
///
/// # Concurrency
///
/// Every record carries an integer version. [`update`](Self::update) writes
/// only if the stored version still equals the version on the supplied record,
/// and the comparison and the write happen in one storage statement. There is
/// no locking and no retry: a lost race is reported as `EditConflict` and the
/// caller decides what to do.
///
/// # Deadlines
///
/// Every operation is bounded by the backend's operation timeout. Exceeding it
/// returns `Timeout`, which is never reported as `NotFound` or
/// `EditConflict`.
///
/// # Example
///
/// ```ignore
/// use crm_persistence::core::ResourceStore;
/// use crm_persistence::types::Cabinet;
///
/// async fn example<S: ResourceStore<Cabinet>>(store: &S) -> StoreResult<()> {
///     let cabinet = store.insert(Cabinet::new("A", "X")).await?;
///     assert_eq!(cabinet.meta.version, 1);
///
///     let mut edited = store.get(cabinet.meta.id).await?;
///     edited.name = "B".to_string();
///     let edited = store.update(edited).await?;
///     assert_eq!(edited.meta.version, 2);
///
///     store.delete(edited.meta.id).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ResourceStore<R: Record>: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Inserts a new record.
    ///
    /// Any identity or version already on `record` is ignored.
    ///
    /// # Returns
    ///
    /// The record with a fresh identity, version `1` and timestamps.
    ///
    /// # Errors
    ///
    /// * `StoreError::DuplicateKey` - If a uniqueness constraint is violated
    /// * `StoreError::Timeout` - If the deadline elapsed
    /// * `StoreError::Unknown` - For any other storage failure
    async fn insert(&self, record: R) -> StoreResult<R>;

    /// Reads a record by identity.
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - If no record has this identity
    async fn get(&self, id: Uuid) -> StoreResult<R>;

    /// Writes a fully merged record if its version is still current.
    ///
    /// # Returns
    ///
    /// The record with its version incremented and `updated_at` refreshed.
    ///
    /// # Errors
    ///
    /// * `StoreError::EditConflict` - If the stored version differs from
    ///   `record`'s, or the record no longer exists. Nothing is written.
    async fn update(&self, record: R) -> StoreResult<R>;

    /// Deletes a record by identity.
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - If no record was removed
    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Lists one page of records matching `filter`.
    ///
    /// `params` is validated against [`Record::SORT_SAFELIST`] and the
    /// backend's maximum page size before storage is touched. An empty result
    /// is not an error.
    ///
    /// # Errors
    ///
    /// * `StoreError::ValidationFailed` - If `params` is out of bounds or the
    ///   sort value is not permitted
    async fn list(&self, filter: &R::Filter, params: &ListParams) -> StoreResult<Page<R>>;
}

/// User storage with lookup by sign-in address.
#[async_trait]
pub trait UserStore: ResourceStore<User> {
    /// Reads a user by email, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - If no user has this email
    async fn get_by_email(&self, email: &str) -> StoreResult<User>;
}
