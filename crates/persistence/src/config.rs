//! Storage configuration.
//!
//! All fields have defaults, so a partial document (or none at all) is a
//! valid configuration:
//!
//! ```
//! use crm_persistence::config::SqliteBackendConfig;
//!
//! let config: SqliteBackendConfig =
//!     serde_json::from_str(r#"{"max_page_size": 50}"#).unwrap();
//! assert_eq!(config.max_page_size, 50);
//! assert_eq!(config.operation_timeout_ms, 3000);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteBackendConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// How long a pool checkout may wait, in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Deadline for a single store operation, in milliseconds.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Upper bound on the page size accepted by list operations.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Enable foreign key constraints.
    #[serde(default = "default_true")]
    pub enable_foreign_keys: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    3000
}

fn default_busy_timeout_ms() -> u32 {
    2000
}

fn default_operation_timeout_ms() -> u64 {
    3000
}

fn default_max_page_size() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
            max_page_size: default_max_page_size(),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

impl SqliteBackendConfig {
    /// Pool checkout deadline.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// SQLite busy handler wait.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.busy_timeout_ms))
    }

    /// Per-operation deadline.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_connections == 0 {
            errors.push("Max connections cannot be 0".to_string());
        }

        if self.min_connections > self.max_connections {
            errors.push("Min connections cannot exceed max connections".to_string());
        }

        if self.operation_timeout_ms == 0 {
            errors.push("Operation timeout cannot be 0".to_string());
        }

        if self.max_page_size == 0 {
            errors.push("Max page size cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
