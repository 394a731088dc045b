use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const CURRENT_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (secret_notes)");
        // Timestamps are fixed-width RFC 3339 UTC text, so string order is time order.
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE IF NOT EXISTS secret_notes (
                id              TEXT PRIMARY KEY,
                message         TEXT NOT NULL,
                password_hash   TEXT NOT NULL,
                sender_name     TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                expires_at      TEXT NOT NULL,
                view_count      INTEGER NOT NULL DEFAULT 0 CHECK (view_count >= 0)
            );

            CREATE INDEX IF NOT EXISTS idx_secret_notes_expires
                ON secret_notes(expires_at);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete (schema v{})", CURRENT_VERSION);
    Ok(())
}
