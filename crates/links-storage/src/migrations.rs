//! Schema migrations
//!
//! Applied versions are tracked in `PRAGMA user_version`. Each entry runs
//! once, in order, inside its own transaction.

use rusqlite::Connection;

use crate::Result;

const MIGRATIONS: &[(&str, &str)] = &[("initial schema", V1_INITIAL)];

// `items.alias` is indexed but not unique: duplicates resolve by creation order.
const V1_INITIAL: &str = r#"
    CREATE TABLE items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        alias TEXT NOT NULL,
        name TEXT NOT NULL DEFAULT '',
        url TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_items_alias ON items(alias);

    CREATE TABLE logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        alias TEXT NOT NULL,
        args TEXT NOT NULL DEFAULT '[]',
        device_id TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_logs_alias ON logs(alias);
    CREATE INDEX idx_logs_created ON logs(created_at);

    CREATE TABLE devices (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        token TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX idx_devices_token ON devices(token);

    CREATE TABLE settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

pub(crate) fn schema_version(conn: &Connection) -> Result<usize> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(usize::try_from(version).unwrap_or_default())
}

pub(crate) fn run_migrations(conn: &Connection) -> Result<()> {
    let applied = schema_version(conn)?;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate().skip(applied) {
        let version = index + 1;
        tracing::info!(version, name, "Applying migration");

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version as i64)?;
        tx.commit()?;
    }

    Ok(())
}
