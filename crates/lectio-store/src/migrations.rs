//! Database migrations and schema management.

use crate::error::StoreResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial database schema...");
        create_initial_schema(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating database from version {} to {}",
            current_version, SCHEMA_VERSION
        );
        run_migrations(conn, current_version)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> StoreResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> StoreResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        -- Ingested documents and everything generated for them
        CREATE TABLE IF NOT EXISTS literature (
            id TEXT PRIMARY KEY,
            original_name TEXT NOT NULL,
            storage_path TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            file_type TEXT NOT NULL,
            content_length INTEGER NOT NULL,
            reading_guide TEXT,
            tags TEXT,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'processing',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_literature_status ON literature(status);
        CREATE INDEX IF NOT EXISTS idx_literature_created ON literature(created_at);
        "#,
    )?;

    Ok(())
}

fn run_migrations(conn: &Connection, from_version: i32) -> StoreResult<()> {
    // Future migrations go here
    let _ = (conn, from_version);

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}
