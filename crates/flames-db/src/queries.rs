use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, ffi};

use crate::Database;
use crate::error::StoreError;
use crate::models::{Note, NoteRow, RevealedNote, decode_timestamp, encode_timestamp};

impl Database {
    /// Insert a new note. Returns `false` if the id is already taken.
    pub fn insert_note(&self, row: &NoteRow) -> Result<bool, StoreError> {
        self.with_conn_mut(|conn| {
            let result = conn.execute(
                "INSERT INTO secret_notes (id, message, password_hash, sender_name, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    row.id,
                    row.message,
                    row.password_hash,
                    row.sender_name,
                    encode_timestamp(row.created_at),
                    encode_timestamp(row.expires_at),
                ],
            );

            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation
                        && e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Fetch a note that has not expired as of `now`.
    pub fn get_live_note(&self, id: &str, now: DateTime<Utc>) -> Result<Option<Note>, StoreError> {
        self.with_conn(|conn| query_live_note(conn, id, now))
    }

    pub fn get_live_password_hash(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT password_hash FROM secret_notes WHERE id = ?1 AND expires_at >= ?2",
                rusqlite::params![id, encode_timestamp(now)],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Bump the view counter and read the note back in one statement.
    ///
    /// Concurrent callers each see their own increment. Returns `None` if the
    /// note is gone or expired by the time the update runs.
    pub fn increment_view_count(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<RevealedNote>, StoreError> {
        self.with_conn_mut(|conn| {
            conn.query_row(
                "UPDATE secret_notes SET view_count = view_count + 1
                 WHERE id = ?1 AND expires_at >= ?2
                 RETURNING message, sender_name, view_count",
                rusqlite::params![id, encode_timestamp(now)],
                |row| {
                    Ok(RevealedNote {
                        message: row.get(0)?,
                        sender_name: row.get(1)?,
                        view_count: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    /// Delete every note whose `expires_at` is strictly before `now`.
    pub fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute(
                "DELETE FROM secret_notes WHERE expires_at < ?1",
                [encode_timestamp(now)],
            )?;
            Ok(deleted as u64)
        })
    }
}

fn query_live_note(conn: &Connection, id: &str, now: DateTime<Utc>) -> Result<Option<Note>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, message, sender_name, created_at, expires_at, view_count
         FROM secret_notes
         WHERE id = ?1 AND expires_at >= ?2",
    )?;

    stmt.query_row(rusqlite::params![id, encode_timestamp(now)], |row| {
        let created_at: String = row.get(3)?;
        let expires_at: String = row.get(4)?;
        Ok(Note {
            id: row.get(0)?,
            message: row.get(1)?,
            sender_name: row.get(2)?,
            created_at: decode_timestamp(3, &created_at)?,
            expires_at: decode_timestamp(4, &expires_at)?,
            view_count: row.get(5)?,
        })
    })
    .optional()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
