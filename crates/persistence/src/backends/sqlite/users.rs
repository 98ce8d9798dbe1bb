//! User table layout and email lookup.

use async_trait::async_trait;
use rusqlite::Row;
use rusqlite::types::Value;

use crate::core::UserStore;
use crate::credentials::Password;
use crate::error::StoreResult;
use crate::types::{RecordMeta, User};

use super::store::{SqliteRecord, SqliteStore};

impl SqliteRecord for User {
    const TABLE: &'static str = "users";

    const COLUMNS: &'static [&'static str] = &["full_name", "email", "password_hash", "activated"];

    fn sort_column(key: &str) -> Option<&'static str> {
        match key {
            "id" => Some("id"),
            "full_name" => Some("full_name"),
            "email" => Some("email"),
            _ => None,
        }
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.full_name.clone()),
            Value::Text(self.email.clone()),
            self.password
                .hash()
                .map_or(Value::Null, |hash| Value::Text(hash.to_string())),
            Value::Integer(i64::from(self.activated)),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(User {
            meta,
            full_name: row.get(offset)?,
            email: row.get(offset + 1)?,
            password: Password::from_hash(row.get::<_, String>(offset + 2)?),
            activated: row.get(offset + 3)?,
        })
    }
}

#[async_trait]
impl UserStore for SqliteStore<User> {
    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        self.get_by("email", email.to_string()).await
    }
}
