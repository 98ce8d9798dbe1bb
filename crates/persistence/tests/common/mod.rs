//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::Path;

use chrono::NaiveDate;

use crm_persistence::backends::sqlite::SqliteBackend;
use crm_persistence::config::SqliteBackendConfig;
use crm_persistence::models::Models;
use crm_persistence::types::{Gender, NewUser, Teacher};

/// In-memory backend with the schema applied.
pub fn create_backend() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to initialize schema");
    backend
}

/// Stores over a fresh in-memory backend.
pub fn create_models() -> Models {
    Models::new(create_backend())
}

/// File backend with the schema applied.
pub fn create_file_backend(path: &Path, config: SqliteBackendConfig) -> SqliteBackend {
    let backend =
        SqliteBackend::with_config(path, config).expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to initialize schema");
    backend
}

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn teacher(full_name: &str, gender: Gender) -> Teacher {
    Teacher::new(full_name, date(1990, 5, 17), "+7 900 000-00-00", gender)
}

pub fn new_user(email: &str) -> NewUser {
    NewUser::new("Alice Smith", email, "pa55word!")
}
