//! SQLite connection pool and per-operation deadlines.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, InterruptHandle};

use crate::config::SqliteBackendConfig;
use crate::error::{StoreError, StoreResult};

use super::schema;

/// SQLite backend shared by every store.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: Pool<SqliteConnectionManager>,
    config: Arc<SqliteBackendConfig>,
    is_memory: bool,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .field("connections", &self.pool.state().connections)
            .finish_non_exhaustive()
    }
}

/// Where a running operation is, as seen by its deadline.
enum Deadline {
    /// Waiting for a pooled connection.
    Pending,
    /// Executing on a connection that can be interrupted.
    Running(InterruptHandle),
    /// The deadline elapsed; the operation must not start.
    Expired,
}

impl SqliteBackend {
    /// Creates a new in-memory SQLite backend.
    ///
    /// An in-memory database exists only inside the connection that created
    /// it, so the pool holds exactly one connection for its whole lifetime.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_config(":memory:", SqliteBackendConfig::default())
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::with_config(path, SqliteBackendConfig::default())
    }

    /// Creates a backend with custom configuration.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteBackendConfig) -> StoreResult<Self> {
        config.validate().map_err(|errors| {
            StoreError::unknown(format!("invalid sqlite configuration: {}", errors.join("; ")))
        })?;

        let is_memory = path.as_ref().to_string_lossy() == ":memory:";

        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        };

        let busy_timeout = config.busy_timeout();
        let foreign_keys = config.enable_foreign_keys;
        let wal = config.enable_wal && !is_memory;
        let manager = manager.with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update(None, "foreign_keys", foreign_keys)?;
            if wal {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
            }
            Ok(())
        });

        let builder = Pool::builder().connection_timeout(config.connection_timeout());
        let builder = if is_memory {
            builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            builder
                .max_size(config.max_connections)
                .min_idle(Some(config.min_connections))
        };

        let pool = builder.build(manager).map_err(|e| StoreError::Unknown {
            message: format!("failed to open sqlite database: {}", e),
            source: Some(Box::new(e)),
        })?;

        tracing::info!(
            path = %path.as_ref().display(),
            max_connections = pool.max_size(),
            "sqlite connection pool ready"
        );

        Ok(Self {
            pool,
            config: Arc::new(config),
            is_memory,
        })
    }

    /// Creates the tables, indexes and search triggers if they are missing.
    pub fn init_schema(&self) -> StoreResult<()> {
        let conn = self.pool.get()?;
        schema::initialize_schema(&conn)?;
        tracing::info!(version = schema::SCHEMA_VERSION, "sqlite schema initialized");
        Ok(())
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteBackendConfig {
        &self.config
    }

    /// Runs `f` on a pooled connection within the operation deadline.
    ///
    /// The closure runs on the blocking thread pool. If the deadline elapses
    /// while it is executing, the current statement is interrupted; if it
    /// elapses while waiting for a connection, the closure never runs. Either
    /// way the caller gets `Timeout`.
    pub(crate) async fn run<T, F>(&self, operation: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let deadline = Arc::new(Mutex::new(Deadline::Pending));
        let task_deadline = Arc::clone(&deadline);

        let task = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            {
                let mut state = task_deadline.lock();
                if matches!(*state, Deadline::Expired) {
                    return Err(StoreError::Timeout {
                        message: format!("{} expired before a connection was available", operation),
                    });
                }
                *state = Deadline::Running(conn.get_interrupt_handle());
            }

            let result = f(&mut *conn);

            *task_deadline.lock() = Deadline::Pending;
            result
        });

        let timeout = self.config.operation_timeout();
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(StoreError::unknown(format!("{} task failed: {}", operation, e))),
            Err(_) => {
                {
                    let mut state = deadline.lock();
                    if let Deadline::Running(handle) = &*state {
                        handle.interrupt();
                    }
                    *state = Deadline::Expired;
                }
                tracing::warn!(
                    operation,
                    timeout_ms = timeout.as_millis() as u64,
                    "store operation exceeded its deadline"
                );
                Err(StoreError::Timeout {
                    message: format!("{} exceeded {}ms", operation, timeout.as_millis()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_backend() {
        let backend = SqliteBackend::in_memory().unwrap();
        assert!(backend.is_memory());
        assert!(backend.init_schema().is_ok());
        // Idempotent
        assert!(backend.init_schema().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SqliteBackendConfig {
            max_connections: 0,
            ..Default::default()
        };
        let err = SqliteBackend::with_config(":memory:", config).unwrap_err();
        assert!(err.to_string().contains("Max connections"));
    }

    #[tokio::test]
    async fn test_run_returns_closure_result() {
        let backend = SqliteBackend::in_memory().unwrap();

        let answer = backend
            .run("answer", |conn| {
                Ok(conn.query_row("SELECT 40 + 2", [], |row| row.get::<_, i64>(0))?)
            })
            .await
            .unwrap();

        assert_eq!(answer, 42);
    }

    #[tokio::test]
    async fn test_run_interrupts_long_statement() {
        let config = SqliteBackendConfig {
            operation_timeout_ms: 200,
            ..Default::default()
        };
        let backend = SqliteBackend::with_config(":memory:", config).unwrap();

        let err = backend
            .run("spin", |conn| {
                let n: i64 = conn.query_row(
                    "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c)
                     SELECT count(*) FROM c",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Timeout { .. }));

        // The interrupted connection goes back to the pool in a usable state
        let backend_ok = backend.clone();
        let mut ok = None;
        for _ in 0..50 {
            match backend_ok
                .run("probe", |conn| {
                    Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?)
                })
                .await
            {
                Ok(v) => {
                    ok = Some(v);
                    break;
                }
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(20)).await,
            }
        }
        assert_eq!(ok, Some(1));
    }
}
