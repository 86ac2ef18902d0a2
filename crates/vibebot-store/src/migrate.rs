use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, Transaction};
use vibebot_core::time::now_utc;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Applied in order; `version` is the position in this list, starting at 1.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "001_init",
    sql: include_str!("../migrations/001_init.sql"),
}];

const SCHEMA_TABLE: &str = "CREATE TABLE IF NOT EXISTS vibebot_schema (
  version INTEGER PRIMARY KEY NOT NULL,
  name TEXT NOT NULL,
  applied_at INTEGER NOT NULL
);";

/// Brings the schema up to the newest migration inside one transaction.
/// Each applied migration leaves a row in `vibebot_schema`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(SCHEMA_TABLE)?;

    let current = max_version(&tx)?;
    let latest = MIGRATIONS.last().map_or(0, |migration| migration.version);
    if current > latest {
        return Err(StoreError::Migration(format!(
            "db version {current} newer than available migrations {latest}"
        )));
    }

    let pending = MIGRATIONS.iter().filter(|migration| migration.version > current);
    for migration in pending {
        apply(&tx, migration)?;
    }
    tx.commit()?;
    Ok(())
}

/// Highest applied migration; 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<i64> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'vibebot_schema');",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(0);
    }
    max_version(conn)
}

fn max_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM vibebot_schema;", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

fn apply(tx: &Transaction<'_>, migration: &Migration) -> Result<()> {
    tx.execute_batch(migration.sql).map_err(|err| {
        StoreError::Migration(format!("{} failed: {err}", migration.name))
    })?;
    tx.execute(
        "INSERT INTO vibebot_schema (version, name, applied_at) VALUES (?1, ?2, ?3);",
        params![migration.version, migration.name, now_utc()],
    )?;
    Ok(())
}
