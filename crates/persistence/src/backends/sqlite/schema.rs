//! SQLite schema definitions.

use rusqlite::Connection;

use crate::error::{StoreError, StoreResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
///
/// Every statement is idempotent, so this can run on each start-up.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    let current_version = get_schema_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(StoreError::unknown(format!(
            "database schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    create(conn, "teachers table", TEACHERS)?;
    create(conn, "cabinets table", CABINETS)?;
    create(conn, "subscriptions table", SUBSCRIPTIONS)?;
    create(conn, "users table", USERS)?;
    create(conn, "indexes", INDEXES)?;
    create(conn, "teacher name search", TEACHER_FTS)?;

    if current_version < SCHEMA_VERSION {
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

fn create(conn: &Connection, what: &str, sql: &str) -> StoreResult<()> {
    conn.execute_batch(sql).map_err(|e| StoreError::Unknown {
        message: format!("Failed to create {}: {}", what, e),
        source: Some(Box::new(e)),
    })
}

/// Get the current schema version, 0 for a fresh database.
fn get_schema_version(conn: &Connection) -> StoreResult<i32> {
    create(
        conn,
        "schema_version table",
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> StoreResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

const TEACHERS: &str = "
    CREATE TABLE IF NOT EXISTS teachers (
        id TEXT PRIMARY KEY NOT NULL,
        version INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        full_name TEXT NOT NULL,
        birth_date TEXT NOT NULL,
        phone TEXT NOT NULL,
        note TEXT NOT NULL DEFAULT '',
        gender TEXT NOT NULL CHECK (gender IN ('male', 'female')),
        status TEXT NOT NULL DEFAULT 'active'
            CHECK (status IN ('active', 'vacation', 'archived'))
    );
";

const CABINETS: &str = "
    CREATE TABLE IF NOT EXISTS cabinets (
        id TEXT PRIMARY KEY NOT NULL,
        version INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        name TEXT NOT NULL,
        address TEXT NOT NULL DEFAULT ''
    );
";

const SUBSCRIPTIONS: &str = "
    CREATE TABLE IF NOT EXISTS subscriptions (
        id TEXT PRIMARY KEY NOT NULL,
        version INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        name TEXT NOT NULL,
        price INTEGER NOT NULL CHECK (price > 0),
        type TEXT NOT NULL CHECK (type IN ('monthly', 'visits')),
        duration_months INTEGER,
        sessions_count INTEGER,
        validity_months INTEGER
    );
";

const USERS: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        version INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL COLLATE NOCASE UNIQUE,
        password_hash TEXT NOT NULL,
        activated INTEGER NOT NULL DEFAULT 0
    );
";

const INDEXES: &str = "
    CREATE INDEX IF NOT EXISTS idx_teachers_gender ON teachers(gender);
    CREATE INDEX IF NOT EXISTS idx_teachers_status ON teachers(status);
    CREATE INDEX IF NOT EXISTS idx_subscriptions_type ON subscriptions(type);
";

// FTS5 is compiled into the bundled SQLite. The index is keyed by record id
// because the implicit rowid of a TEXT-keyed table is not stable.
const TEACHER_FTS: &str = "
    CREATE VIRTUAL TABLE IF NOT EXISTS teachers_fts USING fts5(
        record_id UNINDEXED,
        full_name,
        tokenize = 'unicode61'
    );

    CREATE TRIGGER IF NOT EXISTS teachers_fts_insert AFTER INSERT ON teachers
    BEGIN
        INSERT INTO teachers_fts(record_id, full_name) VALUES (new.id, new.full_name);
    END;

    CREATE TRIGGER IF NOT EXISTS teachers_fts_delete AFTER DELETE ON teachers
    BEGIN
        DELETE FROM teachers_fts WHERE record_id = old.id;
    END;

    CREATE TRIGGER IF NOT EXISTS teachers_fts_update AFTER UPDATE OF full_name ON teachers
    BEGIN
        UPDATE teachers_fts SET full_name = new.full_name WHERE record_id = old.id;
    END;
";
