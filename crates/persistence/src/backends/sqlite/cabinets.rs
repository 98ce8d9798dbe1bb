//! Cabinet table layout.

use rusqlite::Row;
use rusqlite::types::Value;

use crate::types::{Cabinet, RecordMeta};

use super::store::SqliteRecord;

impl SqliteRecord for Cabinet {
    const TABLE: &'static str = "cabinets";

    const COLUMNS: &'static [&'static str] = &["name", "address"];

    fn sort_column(key: &str) -> Option<&'static str> {
        match key {
            "id" => Some("id"),
            "name" => Some("name"),
            "address" => Some("address"),
            _ => None,
        }
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.address.clone()),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Cabinet {
            meta,
            name: row.get(offset)?,
            address: row.get(offset + 1)?,
        })
    }
}
