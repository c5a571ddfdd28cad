//! File-based schema migrations.
//!
//! `.sql` files in the migrations directory run in filename order; applied
//! names are recorded in a `_migrations` ledger table so each file runs
//! exactly once per database.

use rusqlite::Connection;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub fn run_migrations(conn: &Connection, migrations_dir: &Path) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let applied: HashSet<String> = {
        let mut stmt = conn.prepare("SELECT name FROM _migrations")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
        names.filter_map(|n| n.ok()).collect()
    };

    let mut files: Vec<PathBuf> = fs::read_dir(migrations_dir)
        .map(|rd| {
            rd.filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();

    tracing::debug!(
        dir = %migrations_dir.display(),
        files = files.len(),
        applied = applied.len(),
        "Collected migration files"
    );

    let mut ran = 0;
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if applied.contains(&name) {
            continue;
        }

        let sql = fs::read_to_string(&path)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        tracing::info!(migration = %name, "Applying migration");
        conn.execute_batch(&sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [&name])?;
        ran += 1;
    }

    if ran > 0 {
        tracing::info!(count = ran, "Migrations applied successfully");
    } else {
        tracing::debug!("No new migrations to apply");
    }

    Ok(())
}
