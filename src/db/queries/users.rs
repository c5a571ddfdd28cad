use crate::models::User;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

pub fn create_user(conn: &Connection, username: &str, password_hash: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?, ?)",
        params![username, password_hash],
    )?;
    let id = conn.last_insert_rowid();
    debug!(user_id = id, "Created user");
    Ok(id)
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, username, password_hash, created_at
         FROM users WHERE username = ?",
        [username],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .optional()
}
