use chrono::{DateTime, Utc};
use tracing::error;
use uuid::Uuid;

use chirpy_db::models::{ChirpRow, UserRow};
use chirpy_types::models::{Chirp, User};

use crate::error::ApiError;

fn corrupt(what: &str, value: &str, err: impl std::fmt::Display) -> ApiError {
    error!("Corrupt {} '{}' in database: {}", what, value, err);
    ApiError::Internal("Internal server error".into())
}

pub fn parse_id(value: &str) -> Result<Uuid, ApiError> {
    value.parse().map_err(|e| corrupt("id", value, e))
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt("timestamp", value, e))
}

pub fn user_from_row(row: UserRow) -> Result<User, ApiError> {
    Ok(User {
        id: parse_id(&row.id)?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
        email: row.email,
        is_chirpy_red: row.is_chirpy_red,
    })
}

pub fn chirp_from_row(row: ChirpRow) -> Result<Chirp, ApiError> {
    Ok(Chirp {
        id: parse_id(&row.id)?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
        body: row.body,
        user_id: parse_id(&row.user_id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_user_row_without_hash() {
        let id = Uuid::new_v4();
        let row = UserRow {
            id: id.to_string(),
            created_at: "2026-01-02T03:04:05.000000Z".into(),
            updated_at: "2026-01-02T03:04:06.000000Z".into(),
            email: "a@b.c".into(),
            hashed_password: "secret".into(),
            is_chirpy_red: true,
        };
        let user = user_from_row(row).unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_chirpy_red);
        assert!(user.updated_at > user.created_at);

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("hashed_password").is_none());
    }

    #[test]
    fn corrupt_row_is_internal() {
        let row = ChirpRow {
            id: "not-a-uuid".into(),
            created_at: "2026-01-02T03:04:05Z".into(),
            updated_at: "2026-01-02T03:04:05Z".into(),
            body: "hi".into(),
            user_id: Uuid::new_v4().to_string(),
        };
        assert!(matches!(chirp_from_row(row), Err(ApiError::Internal(_))));
    }
}
