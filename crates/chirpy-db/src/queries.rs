use crate::models::{ChirpRow, RefreshTokenRow, UserRow, UserUpdate};
use crate::{Database, format_timestamp};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, Row, ffi};

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_chirpy_red";
const CHIRP_COLUMNS: &str = "id, created_at, updated_at, body, user_id";

impl Database {
    // -- Users --

    /// Insert a user. Returns `None` if the email is already registered.
    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        hashed_password: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRow>> {
        let ts = format_timestamp(now);
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, created_at, updated_at, email, hashed_password)
                 VALUES (?1, ?2, ?2, ?3, ?4)",
                (id, &ts, email, hashed_password),
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
            let user = query_user(conn, "id", id)?
                .ok_or_else(|| anyhow::anyhow!("User vanished after insert: {}", id))?;
            Ok(Some(user))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Replace email and password hash.
    pub fn update_user(
        &self,
        id: &str,
        email: &str,
        hashed_password: &str,
        now: DateTime<Utc>,
    ) -> Result<UserUpdate> {
        let ts = format_timestamp(now);
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET email = ?1, hashed_password = ?2, updated_at = ?3 WHERE id = ?4",
                (email, hashed_password, &ts, id),
            );
            let changed = match changed {
                Ok(n) => n,
                Err(e) if is_unique_violation(&e) => return Ok(UserUpdate::EmailTaken),
                Err(e) => return Err(e.into()),
            };
            if changed == 0 {
                return Ok(UserUpdate::NotFound);
            }
            Ok(match query_user(conn, "id", id)? {
                Some(user) => UserUpdate::Updated(user),
                None => UserUpdate::NotFound,
            })
        })
    }

    /// Mark a user as a Chirpy Red member. Returns false if the user does not exist.
    pub fn upgrade_user_to_red(&self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let ts = format_timestamp(now);
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_chirpy_red = 1, updated_at = ?1 WHERE id = ?2",
                (&ts, id),
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete every user. Chirps and refresh tokens go with them via ON DELETE CASCADE.
    pub fn delete_all_users(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users", [])?))
    }

    // -- Chirps --

    pub fn create_chirp(
        &self,
        id: &str,
        body: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChirpRow> {
        let ts = format_timestamp(now);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chirps (id, created_at, updated_at, body, user_id)
                 VALUES (?1, ?2, ?2, ?3, ?4)",
                (id, &ts, body, user_id),
            )?;
            query_chirp(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Chirp vanished after insert: {}", id))
        })
    }

    pub fn get_chirp(&self, id: &str) -> Result<Option<ChirpRow>> {
        self.with_conn(|conn| query_chirp(conn, id))
    }

    /// All chirps ordered by creation time, optionally restricted to one author.
    pub fn list_chirps(&self, author_id: Option<&str>, descending: bool) -> Result<Vec<ChirpRow>> {
        self.with_conn(|conn| query_chirps(conn, author_id, descending))
    }

    /// Returns true if a chirp was deleted.
    pub fn delete_chirp(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM chirps WHERE id = ?1", [id])? > 0))
    }

    // -- Refresh tokens --

    pub fn create_refresh_token(
        &self,
        token: &str,
        user_id: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let ts = format_timestamp(now);
        let expires = format_timestamp(expires_at);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at)
                 VALUES (?1, ?2, ?2, ?3, ?4)",
                (token, &ts, user_id, &expires),
            )?;
            Ok(())
        })
    }

    pub fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT token, created_at, updated_at, user_id, expires_at, revoked_at
                 FROM refresh_tokens WHERE token = ?1",
                [token],
                |row| {
                    Ok(RefreshTokenRow {
                        token: row.get(0)?,
                        created_at: row.get(1)?,
                        updated_at: row.get(2)?,
                        user_id: row.get(3)?,
                        expires_at: row.get(4)?,
                        revoked_at: row.get(5)?,
                    })
                },
            )
            .optional()
        })
    }

    /// Stamp `revoked_at` on a token. An already revoked token keeps its first
    /// revocation time. Returns false if the token does not exist.
    pub fn revoke_refresh_token(&self, token: &str, now: DateTime<Utc>) -> Result<bool> {
        let ts = format_timestamp(now);
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE refresh_tokens
                 SET revoked_at = COALESCE(revoked_at, ?1), updated_at = ?1
                 WHERE token = ?2",
                (&ts, token),
            )?;
            Ok(changed > 0)
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        updated_at: row.get(2)?,
        email: row.get(3)?,
        hashed_password: row.get(4)?,
        is_chirpy_red: row.get(5)?,
    })
}

fn chirp_from_row(row: &Row<'_>) -> rusqlite::Result<ChirpRow> {
    Ok(ChirpRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        updated_at: row.get(2)?,
        body: row.get(3)?,
        user_id: row.get(4)?,
    })
}

/// `column` is one of our own constants, never caller input.
fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([value], user_from_row).optional()
}

fn query_chirp(conn: &Connection, id: &str) -> Result<Option<ChirpRow>> {
    let sql = format!("SELECT {} FROM chirps WHERE id = ?1", CHIRP_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    stmt.query_row([id], chirp_from_row).optional()
}

fn query_chirps(
    conn: &Connection,
    author_id: Option<&str>,
    descending: bool,
) -> Result<Vec<ChirpRow>> {
    let order = if descending { "DESC" } else { "ASC" };
    // rowid breaks ties between chirps created within the same microsecond
    let sql = format!(
        "SELECT {} FROM chirps
         WHERE (?1 IS NULL OR user_id = ?1)
         ORDER BY created_at {order}, rowid {order}",
        CHIRP_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([author_id], chirp_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
