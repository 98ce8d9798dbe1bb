//! Persistence metadata shared by every record kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity, concurrency token and timestamps of a stored record.
///
/// The store assigns every field. A record that has not been inserted yet
/// carries the nil id and version `0`; the first successful insert sets the
/// version to `1` and each successful update increments it by one.
///
/// # Examples
///
/// ```
/// use crm_persistence::types::RecordMeta;
///
/// let meta = RecordMeta::default();
/// assert!(!meta.is_stored());
/// assert_eq!(meta.version, 0);
/// assert_eq!(meta.etag(), "W/\"0\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Server-assigned identity, immutable after insert.
    pub id: Uuid,

    /// Concurrency token compared on every update.
    pub version: i64,

    /// When the record was inserted.
    pub created_at: DateTime<Utc>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            version: 0,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }
}

impl RecordMeta {
    /// Metadata for a record about to be inserted.
    pub(crate) fn initial(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true once the record has been inserted.
    pub fn is_stored(&self) -> bool {
        !self.id.is_nil() && self.version > 0
    }

    /// Weak ETag derived from the version, for HTTP conditional requests.
    pub fn etag(&self) -> String {
        format!("W/\"{}\"", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_meta() {
        let now = Utc::now();
        let meta = RecordMeta::initial(now);

        assert!(meta.is_stored());
        assert_eq!(meta.version, 1);
        assert_eq!(meta.created_at, now);
        assert_eq!(meta.updated_at, now);
        assert_eq!(meta.etag(), "W/\"1\"");
    }

    #[test]
    fn test_initial_ids_are_unique() {
        let now = Utc::now();
        assert_ne!(RecordMeta::initial(now).id, RecordMeta::initial(now).id);
    }
}
