//! The four record stores behind one shared backend.

use crate::backends::sqlite::{SqliteBackend, SqliteStore};
use crate::types::{Cabinet, Subscription, Teacher, User};

/// One store per record kind, all sharing the connection pool of a single
/// injected [`SqliteBackend`].
///
/// # Examples
///
/// ```
/// use crm_persistence::backends::sqlite::SqliteBackend;
/// use crm_persistence::models::Models;
///
/// let backend = SqliteBackend::in_memory().unwrap();
/// backend.init_schema().unwrap();
/// let models = Models::new(backend);
/// assert!(models.cabinets.backend().is_memory());
/// ```
#[derive(Debug, Clone)]
pub struct Models {
    /// Teacher store.
    pub teachers: SqliteStore<Teacher>,
    /// Cabinet store.
    pub cabinets: SqliteStore<Cabinet>,
    /// Subscription store.
    pub subscriptions: SqliteStore<Subscription>,
    /// User store.
    pub users: SqliteStore<User>,
}

impl Models {
    /// Builds every store on `backend`.
    pub fn new(backend: SqliteBackend) -> Self {
        Self {
            teachers: SqliteStore::new(backend.clone()),
            cabinets: SqliteStore::new(backend.clone()),
            subscriptions: SqliteStore::new(backend.clone()),
            users: SqliteStore::new(backend),
        }
    }
}
