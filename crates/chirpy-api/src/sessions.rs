use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use chirpy_auth::{REFRESH_TOKEN_TTL, make_refresh_token};
use chirpy_db::Database;

use crate::convert::{parse_id, parse_timestamp};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("refresh token not found")]
    NotFound,
    #[error("refresh token has expired")]
    Expired,
    #[error("refresh token has been revoked")]
    Revoked,
    #[error("refresh token store failure: {0}")]
    Store(String),
}

impl From<anyhow::Error> for SessionError {
    fn from(e: anyhow::Error) -> Self {
        SessionError::Store(format!("{:#}", e))
    }
}

impl From<crate::error::ApiError> for SessionError {
    fn from(e: crate::error::ApiError) -> Self {
        SessionError::Store(e.to_string())
    }
}

/// Mint a new refresh token for `user_id`, valid for [`REFRESH_TOKEN_TTL`] from `now`.
pub fn issue(db: &Database, user_id: Uuid, now: DateTime<Utc>) -> Result<String, SessionError> {
    let token = make_refresh_token();
    db.create_refresh_token(&token, &user_id.to_string(), now, now + REFRESH_TOKEN_TTL)?;
    Ok(token)
}

/// Look up the owner of a refresh token that is neither revoked nor expired at `now`.
pub fn resolve(db: &Database, token: &str, now: DateTime<Utc>) -> Result<Uuid, SessionError> {
    let row = db.get_refresh_token(token)?.ok_or(SessionError::NotFound)?;

    if row.revoked_at.is_some() {
        return Err(SessionError::Revoked);
    }
    if now > parse_timestamp(&row.expires_at)? {
        return Err(SessionError::Expired);
    }

    Ok(parse_id(&row.user_id)?)
}

/// Revoke a refresh token. Revoking twice is not an error.
pub fn revoke(db: &Database, token: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
    if db.revoke_refresh_token(token, now)? {
        Ok(())
    } else {
        Err(SessionError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn db_with_user() -> (Database, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), "session@example.com", "hash", Utc::now()).unwrap();
        (db, id)
    }

    #[test]
    fn issue_then_resolve() {
        let (db, user_id) = db_with_user();
        let now = Utc::now();
        let token = issue(&db, user_id, now).unwrap();
        assert_eq!(resolve(&db, &token, now).unwrap(), user_id);
    }

    #[test]
    fn unknown_token() {
        let (db, _) = db_with_user();
        assert!(matches!(resolve(&db, "nope", Utc::now()), Err(SessionError::NotFound)));
        assert!(matches!(revoke(&db, "nope", Utc::now()), Err(SessionError::NotFound)));
    }

    #[test]
    fn expires_after_sixty_days() {
        let (db, user_id) = db_with_user();
        let now = Utc::now();
        let token = issue(&db, user_id, now).unwrap();

        assert!(resolve(&db, &token, now + Duration::days(59)).is_ok());
        assert!(matches!(
            resolve(&db, &token, now + Duration::days(61)),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn revoked_token_unusable_and_revoke_is_idempotent() {
        let (db, user_id) = db_with_user();
        let now = Utc::now();
        let token = issue(&db, user_id, now).unwrap();

        revoke(&db, &token, now).unwrap();
        revoke(&db, &token, now).unwrap();
        assert!(matches!(resolve(&db, &token, now), Err(SessionError::Revoked)));
    }
}
