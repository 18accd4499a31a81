//! Schema upgrades keyed on `PRAGMA user_version`.
//!
//! `MIGRATIONS[n]` lifts a file from version `n` to `n + 1`. Pending steps run
//! in one transaction together with the version bump.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    name: "schema_v1.sql",
    sql: include_str!("schemas/schema_v1.sql"),
}];

const CURRENT_SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

fn user_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")
}

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let version = user_version(conn)?;
    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "history file uses schema version {version}, newer than this build \
             understands ({CURRENT_SCHEMA_VERSION})"
        );
    }

    let pending = &MIGRATIONS[version.max(0) as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;
    for migration in pending {
        tx.execute_batch(migration.sql)
            .with_context(|| format!("failed to apply {}", migration.name))?;
        log_info!("applied {}", migration.name);
    }
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(user_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);

        let columns: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('tracks') ORDER BY cid")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(columns, ["id", "timestamp", "artist", "title"]);
    }

    #[test]
    fn migrating_twice_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(user_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION + 1)
            .unwrap();
        let err = run_migrations(&mut conn).unwrap_err();
        assert!(err.to_string().contains("newer than this build"));
    }

    #[test]
    fn migration_table_defines_the_current_version() {
        assert_eq!(CURRENT_SCHEMA_VERSION as usize, MIGRATIONS.len());
        assert!(MIGRATIONS[0].sql.contains("CREATE TABLE"));
    }
}
