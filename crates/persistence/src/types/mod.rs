//! Core types for the persistence layer.
//!
//! This module provides the value types used throughout the crate:
//!
//! - [`RecordMeta`] - identity, concurrency token and timestamps
//! - [`Teacher`], [`Cabinet`], [`Subscription`], [`User`] - the domain records
//!   and their partial-patch counterparts
//! - [`ListParams`], [`SortDirective`] - list request parameters
//! - [`Page`], [`Metadata`] - list results
//!
//! # Examples
//!
//! ## Building a record
//!
//! ```
//! use crm_persistence::types::Cabinet;
//!
//! let cabinet = Cabinet::new("Room 101", "Main street 1");
//! assert!(!cabinet.meta.is_stored());
//! ```
//!
//! ## List parameters
//!
//! ```
//! use crm_persistence::types::{ListParams, SortDirection};
//!
//! let params = ListParams::new(2, 50).with_sort("-name");
//! assert_eq!(params.offset(), 50);
//! assert_eq!(params.sort_directive().direction, SortDirection::Descending);
//! ```

use thiserror::Error;

mod cabinet;
mod pagination;
mod query;
mod record_meta;
mod subscription;
mod teacher;
mod user;

pub use cabinet::{Cabinet, CabinetPatch};
pub use pagination::{Metadata, Page};
pub use query::{ListParams, MAX_PAGE, SortDirection, SortDirective};
pub use record_meta::RecordMeta;
pub use subscription::{Subscription, SubscriptionFilter, SubscriptionKind, SubscriptionPatch};
pub use teacher::{Gender, Teacher, TeacherFilter, TeacherPatch, TeacherStatus};
pub use user::{NewUser, User, UserPatch, validate_email, validate_password_plaintext};

/// A stored or supplied string is not a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value: {value:?}")]
pub struct ParseEnumError {
    /// The enumeration being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Deserializes a present field (including an explicit `null`) as `Some`.
///
/// Paired with `#[serde(default)]`, an absent field stays `None` while
/// `null` becomes `Some(None)`, so patches can tell "leave as is" apart from
/// "clear".
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
