//! Single-step `notes` schema creation.
//!
//! # Invariants
//! - Creation is additive (`IF NOT EXISTS`) and safe on every startup.
//! - A database stamped with a newer `user_version` is never touched.
//! - A pre-existing `notes` table is adopted only if every column matches the
//!   declared type and nullability; otherwise startup fails.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version` once `notes` exists.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_NOTES_SQL: &str = "CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL DEFAULT '',
    note TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL
);";

struct ExpectedColumn {
    name: &'static str,
    declared_type: &'static str,
    not_null: bool,
    describe: &'static str,
}

/// Columns as created by `CREATE_NOTES_SQL`; reads rely on these exact types.
const EXPECTED_COLUMNS: &[ExpectedColumn] = &[
    ExpectedColumn {
        name: "id",
        declared_type: "INTEGER",
        not_null: false,
        describe: "INTEGER",
    },
    ExpectedColumn {
        name: "title",
        declared_type: "TEXT",
        not_null: true,
        describe: "TEXT NOT NULL",
    },
    ExpectedColumn {
        name: "note",
        declared_type: "TEXT",
        not_null: true,
        describe: "TEXT NOT NULL",
    },
    ExpectedColumn {
        name: "created_at",
        declared_type: "INTEGER",
        not_null: true,
        describe: "INTEGER NOT NULL",
    },
];

/// Ensures the `notes` table exists and the version marker is set.
///
/// Runs inside one transaction so a failed create leaves no partial marker.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(CREATE_NOTES_SQL)?;
    check_notes_columns(&tx)?;
    if current_version < SCHEMA_VERSION {
        tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }
    tx.commit()?;

    Ok(())
}

fn check_notes_columns(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(notes);")?;
    let mut rows = stmt.query([])?;
    let mut found: Vec<(String, String, bool)> = Vec::new();
    while let Some(row) = rows.next()? {
        found.push((row.get("name")?, row.get("type")?, row.get("notnull")?));
    }

    for expected in EXPECTED_COLUMNS {
        let actual = found.iter().find(|(name, _, _)| name == expected.name);
        let compatible = actual.is_some_and(|(_, declared, not_null)| {
            declared.eq_ignore_ascii_case(expected.declared_type)
                && (*not_null || !expected.not_null)
        });
        if compatible {
            continue;
        }

        let found_desc = match actual {
            Some((_, declared, true)) => format!("{declared} NOT NULL"),
            Some((_, declared, false)) => declared.clone(),
            None => "no such column".to_string(),
        };
        return Err(DbError::IncompatibleSchema {
            column: expected.name,
            expected: expected.describe,
            found: found_desc,
        });
    }

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
