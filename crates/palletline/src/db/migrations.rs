//! Schema migrations.
//!
//! `_migrations` records every applied version. Each pending migration runs
//! in its own transaction together with its bookkeeping row, so a failed
//! script leaves the schema at the previous version.

use rusqlite::{params, Connection};

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Ordered by version; versions are never reused.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_scans_table",
        sql: include_str!("sql/001_create_scans.sql"),
    },
    Migration {
        version: 2,
        description: "index_scans",
        sql: include_str!("sql/002_index_scans.sql"),
    },
    Migration {
        version: 3,
        description: "create_inventory_tables",
        sql: include_str!("sql/003_create_inventory.sql"),
    },
];

/// Brings the schema up to the latest version.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        log::info!("Applying schema v{} ({})", migration.version, migration.description);
        apply(conn, migration).map_err(|e| DatabaseError::Migration {
            version: migration.version,
            reason: e.to_string(),
        })?;
    }

    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), rusqlite::Error> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
        params![migration.version, migration.description],
    )?;
    tx.commit()
}
