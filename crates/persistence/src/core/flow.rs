//! Write flows shared by every caller.
//!
//! Stores accept only fully specified records. These functions put the
//! validation gate and the fetch-merge-write sequence in front of them, and
//! turn uniqueness violations into field errors.

use uuid::Uuid;

use super::{Patch, Record, ResourceStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{NewUser, User};
use crate::validation::{Validate, ValidationErrors};

/// Validates `record` and inserts it.
///
/// An invalid record never reaches the store.
pub async fn create<R, S>(store: &S, record: R) -> StoreResult<R>
where
    R: Record,
    S: ResourceStore<R> + ?Sized,
{
    record.validated()?;
    store.insert(record).await.map_err(translate_unique::<R>)
}

/// Fetches a record, merges `patch` into it, re-validates and writes it back.
///
/// The write is conditional on the version fetched here. If another writer
/// got in between, `EditConflict` is returned and nothing is retried.
pub async fn patch<R, P, S>(store: &S, id: Uuid, patch: P) -> StoreResult<R>
where
    R: Record,
    P: Patch<R>,
    S: ResourceStore<R> + ?Sized,
{
    let mut record = store.get(id).await?;
    patch.apply(&mut record);
    record.validated()?;
    store.update(record).await.map_err(translate_unique::<R>)
}

/// Validates a registration, hashes its password and inserts the user.
///
/// A duplicate email is reported as a validation failure on `email`.
pub async fn register_user<S>(store: &S, new_user: NewUser) -> StoreResult<User>
where
    S: ResourceStore<User> + ?Sized,
{
    new_user.validated()?;

    // Hashing blocks for tens of milliseconds.
    let user = tokio::task::spawn_blocking(move || new_user.into_user())
        .await
        .map_err(|e| StoreError::unknown(format!("password hashing task failed: {}", e)))??;

    create(store, user).await
}

fn translate_unique<R: Record>(err: StoreError) -> StoreError {
    match err {
        StoreError::DuplicateKey { constraint } => match R::unique_violation(&constraint) {
            Some((field, message)) => {
                let mut errors = ValidationErrors::default();
                errors.insert(field, message);
                StoreError::ValidationFailed(errors)
            }
            None => StoreError::DuplicateKey { constraint },
        },
        other => other,
    }
}
