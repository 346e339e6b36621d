use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, chirps)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                email           TEXT NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL
            );

            CREATE TABLE chirps (
                id          TEXT PRIMARY KEY,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                body        TEXT NOT NULL,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_chirps_created ON chirps(created_at);
            CREATE INDEX idx_chirps_user ON chirps(user_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (refresh tokens)");
        conn.execute_batch(
            "
            CREATE TABLE refresh_tokens (
                token       TEXT PRIMARY KEY,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at  TEXT NOT NULL,
                revoked_at  TEXT
            );

            CREATE INDEX idx_refresh_tokens_user ON refresh_tokens(user_id);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    if version < 3 {
        info!("Running migration v3 (chirpy red)");
        conn.execute_batch(
            "
            ALTER TABLE users ADD COLUMN is_chirpy_red INTEGER NOT NULL DEFAULT 0;

            INSERT INTO schema_version (version) VALUES (3);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 3);
    }
}
