//! The record protocol shared by every resource kind.

use std::fmt;

use uuid::Uuid;

use crate::types::RecordMeta;
use crate::validation::Validate;

/// A domain record persisted by a [`ResourceStore`](super::ResourceStore).
///
/// Implementors embed a [`RecordMeta`] that the store owns: callers never
/// assign identity or version themselves.
pub trait Record: Validate + Clone + fmt::Debug + Send + Sync + 'static {
    /// Resource name used in errors and logs (e.g. "teacher").
    const RESOURCE: &'static str;

    /// Sort values accepted by list operations, including `-` prefixed forms.
    const SORT_SAFELIST: &'static [&'static str];

    /// Filter type accepted by list operations. `Default` matches everything.
    type Filter: Default + Clone + fmt::Debug + Send + Sync + 'static;

    /// Persistence metadata.
    fn meta(&self) -> &RecordMeta;

    /// Mutable persistence metadata.
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// The record's identity.
    fn id(&self) -> Uuid {
        self.meta().id
    }

    /// The record's concurrency token.
    fn version(&self) -> i64 {
        self.meta().version
    }

    /// Maps a violated uniqueness constraint to the field and message shown
    /// to the caller. `None` leaves the `DuplicateKey` error untranslated.
    fn unique_violation(_constraint: &str) -> Option<(&'static str, &'static str)> {
        None
    }
}

/// A partial update that can be merged into a fetched record.
pub trait Patch<R> {
    /// Overwrites the fields of `record` that this patch carries.
    fn apply(self, record: &mut R);
}
