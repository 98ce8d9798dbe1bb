//! Generic SQLite implementation of [`ResourceStore`].
//!
//! Every record kind is stored in its own table with the same four metadata
//! columns (`id`, `version`, `created_at`, `updated_at`) followed by its
//! domain columns. [`SqliteRecord`] describes the domain part; everything
//! else, including the conditional write, is shared.

use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{OptionalExtension, Row, params_from_iter};
use uuid::Uuid;

use crate::core::{Record, ResourceStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{ListParams, Metadata, Page, RecordMeta};
use crate::validation::{ValidationErrors, Validator};

use super::SqliteBackend;
use super::query_builder::{Predicate, Window, build_list_query};

const META_COLUMNS: [&str; 4] = ["id", "version", "created_at", "updated_at"];

/// Table layout of a record kind.
pub trait SqliteRecord: Record {
    /// Table name.
    const TABLE: &'static str;

    /// Domain columns, in the order of [`column_values`](Self::column_values)
    /// and [`from_row`](Self::from_row).
    const COLUMNS: &'static [&'static str];

    /// Maps a safelisted sort key (without `-`) to its column.
    fn sort_column(key: &str) -> Option<&'static str>;

    /// Domain column values, bound in [`COLUMNS`](Self::COLUMNS) order.
    fn column_values(&self) -> Vec<Value>;

    /// Reads the domain columns starting at `offset`.
    fn from_row(meta: RecordMeta, row: &Row<'_>, offset: usize) -> rusqlite::Result<Self>;

    /// Row filters for `filter`. Unset filter fields produce no predicate.
    fn predicates(_filter: &Self::Filter) -> Vec<Predicate> {
        Vec::new()
    }
}

/// SQLite-backed store for one record kind.
pub struct SqliteStore<R> {
    backend: SqliteBackend,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SqliteStore<R> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: SqliteRecord> fmt::Debug for SqliteStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("table", &R::TABLE)
            .finish_non_exhaustive()
    }
}

impl<R: SqliteRecord> SqliteStore<R> {
    /// Creates a store on a shared backend.
    pub fn new(backend: SqliteBackend) -> Self {
        Self {
            backend,
            _record: PhantomData,
        }
    }

    /// Returns the backend this store runs on.
    pub fn backend(&self) -> &SqliteBackend {
        &self.backend
    }

    /// Reads the first record matching `column = value`.
    pub(crate) async fn get_by(&self, column: &'static str, value: String) -> StoreResult<R> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            select_list::<R>(),
            R::TABLE,
            column
        );

        self.backend
            .run("get", move |conn| {
                conn.query_row(&sql, [&value], read_record::<R>)
                    .optional()?
                    .ok_or_else(|| StoreError::not_found(R::RESOURCE, value))
            })
            .await
    }
}

fn columns<R: SqliteRecord>() -> impl Iterator<Item = &'static str> {
    META_COLUMNS.iter().chain(R::COLUMNS.iter()).copied()
}

fn select_list<R: SqliteRecord>() -> String {
    columns::<R>().collect::<Vec<_>>().join(", ")
}

/// Current time at the precision timestamps are stored with.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: StdError + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Reads a text column through `FromStr`.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn read_meta(row: &Row<'_>, offset: usize) -> rusqlite::Result<RecordMeta> {
    Ok(RecordMeta {
        id: parse_column::<Uuid>(row, offset)?,
        version: row.get(offset + 1)?,
        created_at: parse_timestamp(row, offset + 2)?,
        updated_at: parse_timestamp(row, offset + 3)?,
    })
}

fn read_record<R: SqliteRecord>(row: &Row<'_>) -> rusqlite::Result<R> {
    let meta = read_meta(row, 0)?;
    R::from_row(meta, row, META_COLUMNS.len())
}

#[async_trait]
impl<R: SqliteRecord> ResourceStore<R> for SqliteStore<R> {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn insert(&self, mut record: R) -> StoreResult<R> {
        let meta = RecordMeta::initial(now());
        *record.meta_mut() = meta;

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            select_list::<R>(),
            vec!["?"; META_COLUMNS.len() + R::COLUMNS.len()].join(", ")
        );
        let mut values = vec![
            Value::Text(meta.id.to_string()),
            Value::Integer(meta.version),
            Value::Text(format_timestamp(&meta.created_at)),
            Value::Text(format_timestamp(&meta.updated_at)),
        ];
        values.extend(record.column_values());

        self.backend
            .run("insert", move |conn| {
                conn.execute(&sql, params_from_iter(values.iter()))?;
                Ok(())
            })
            .await?;

        tracing::debug!(resource = R::RESOURCE, id = %meta.id, "record inserted");
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> StoreResult<R> {
        self.get_by("id", id.to_string()).await
    }

    async fn update(&self, mut record: R) -> StoreResult<R> {
        let id = record.id();
        let version = record.version();
        let updated_at = now();

        let assignments: Vec<String> = R::COLUMNS.iter().map(|c| format!("{} = ?", c)).collect();
        let sql = format!(
            "UPDATE {} SET {}, version = version + 1, updated_at = ? \
             WHERE id = ? AND version = ? RETURNING version",
            R::TABLE,
            assignments.join(", ")
        );
        let mut values = record.column_values();
        values.push(Value::Text(format_timestamp(&updated_at)));
        values.push(Value::Text(id.to_string()));
        values.push(Value::Integer(version));

        let new_version = self
            .backend
            .run("update", move |conn| {
                Ok(conn
                    .query_row(&sql, params_from_iter(values.iter()), |row| {
                        row.get::<_, i64>(0)
                    })
                    .optional()?)
            })
            .await?;

        match new_version {
            Some(new_version) => {
                let meta = record.meta_mut();
                meta.version = new_version;
                meta.updated_at = updated_at;
                tracing::debug!(
                    resource = R::RESOURCE,
                    id = %id,
                    version = new_version,
                    "record updated"
                );
                Ok(record)
            }
            None => {
                tracing::warn!(resource = R::RESOURCE, id = %id, version, "edit conflict");
                Err(StoreError::EditConflict {
                    resource: R::RESOURCE,
                    id: id.to_string(),
                    version,
                })
            }
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", R::TABLE);
        let key = id.to_string();

        let affected = self
            .backend
            .run("delete", move |conn| Ok(conn.execute(&sql, [&key])?))
            .await?;

        if affected == 0 {
            return Err(StoreError::not_found(R::RESOURCE, id));
        }

        tracing::debug!(resource = R::RESOURCE, id = %id, "record deleted");
        Ok(())
    }

    async fn list(&self, filter: &R::Filter, params: &ListParams) -> StoreResult<Page<R>> {
        let mut v = Validator::new();
        params.validate(&mut v, R::SORT_SAFELIST, self.backend.config().max_page_size);
        v.finish()?;

        let directive = params.sort_directive();
        let sort_column = R::sort_column(&directive.key).ok_or_else(|| {
            let mut errors = ValidationErrors::default();
            errors.insert("sort", "invalid sort value");
            StoreError::ValidationFailed(errors)
        })?;

        let columns: Vec<&str> = columns::<R>().collect();
        let query = build_list_query(
            R::TABLE,
            &columns,
            &R::predicates(filter),
            Window {
                sort_column,
                direction: directive.direction,
                limit: params.limit(),
                offset: params.offset(),
            },
        );

        let (total, items) = self
            .backend
            .run("list", move |conn| {
                let mut stmt = conn.prepare(&query.sql)?;
                let mut rows = stmt.query(params_from_iter(query.params.iter()))?;

                let mut total = 0u64;
                let mut items = Vec::new();
                while let Some(row) = rows.next()? {
                    total = u64::try_from(row.get::<_, i64>(0)?).unwrap_or(0);
                    let meta = read_meta(row, 1)?;
                    items.push(R::from_row(meta, row, 1 + META_COLUMNS.len())?);
                }
                Ok((total, items))
            })
            .await?;

        tracing::debug!(
            resource = R::RESOURCE,
            total,
            page = params.page,
            "records listed"
        );
        Ok(Page::new(
            items,
            Metadata::calculate(total, params.page, params.page_size),
        ))
    }
}
