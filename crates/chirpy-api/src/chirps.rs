use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use chirpy_types::api::CreateChirpRequest;
use chirpy_types::models::Chirp;

use crate::convert::{chirp_from_row, parse_id};
use crate::error::ApiError;
use crate::filter::filter_profanity;
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

/// Longest accepted chirp, in Unicode code points, measured before filtering.
pub const MAX_CHIRP_LENGTH: usize = 140;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Check length limits and return the body with banned words masked.
pub fn clean_body(body: &str) -> Result<String, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("Chirp is empty".into()));
    }
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::BadRequest("Chirp is too long".into()));
    }
    Ok(filter_profanity(body))
}

/// POST /api/chirps
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    payload: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let body = clean_body(&req.body)?;

    let chirp_id = Uuid::new_v4();
    let row = db_call(&state, "Couldn't create chirp", move |db| {
        db.create_chirp(&chirp_id.to_string(), &body, &user_id.to_string(), Utc::now())
    })
    .await?;

    info!("User {} posted chirp {}", user_id, chirp_id);
    Ok((StatusCode::CREATED, Json(chirp_from_row(row)?)))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    State(state): State<AppState>,
    query: Result<Query<ListChirpsQuery>, QueryRejection>,
) -> Result<Json<Vec<Chirp>>, ApiError> {
    let Query(query) = query?;
    let author_id = query.author_id.map(|id| id.to_string());
    let descending = query.sort == SortOrder::Desc;

    let rows = db_call(&state, "Couldn't fetch chirps", move |db| {
        db.list_chirps(author_id.as_deref(), descending)
    })
    .await?;

    let chirps = rows
        .into_iter()
        .map(chirp_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<Json<Chirp>, ApiError> {
    let not_found = || ApiError::NotFound("Couldn't find chirp".into());
    let chirp_id: Uuid = chirp_id.parse().map_err(|_| not_found())?;

    let row = db_call(&state, "Couldn't fetch chirp", move |db| db.get_chirp(&chirp_id.to_string()))
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(chirp_from_row(row)?))
}

/// DELETE /api/chirps/{chirp_id} — only the author may delete a chirp.
pub async fn delete_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(chirp_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let not_found = || ApiError::BadRequest("Chirp not found".into());
    let chirp_id: Uuid = chirp_id.parse().map_err(|_| not_found())?;

    let row = db_call(&state, "Couldn't fetch chirp", move |db| db.get_chirp(&chirp_id.to_string()))
        .await?
        .ok_or_else(not_found)?;

    if parse_id(&row.user_id)? != user_id {
        return Err(ApiError::Forbidden("You can only delete your own chirps".into()));
    }

    db_call(&state, "Couldn't delete chirp", move |db| {
        db.delete_chirp(&chirp_id.to_string())
    })
    .await?;

    info!("User {} deleted chirp {}", user_id, chirp_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_limit_counts_code_points() {
        assert!(clean_body(&"a".repeat(MAX_CHIRP_LENGTH)).is_ok());
        assert!(matches!(
            clean_body(&"a".repeat(MAX_CHIRP_LENGTH + 1)),
            Err(ApiError::BadRequest(_))
        ));
        // 140 multi-byte characters are still 140 code points
        assert!(clean_body(&"é".repeat(MAX_CHIRP_LENGTH)).is_ok());
    }

    #[test]
    fn length_checked_before_filtering() {
        // 145 code points, exactly 140 once "kerfuffle" becomes "****"
        let body = format!("{} kerfuffle", "a".repeat(MAX_CHIRP_LENGTH - 5));
        assert_eq!(body.chars().count(), MAX_CHIRP_LENGTH + 5);
        assert_eq!(filter_profanity(&body).chars().count(), MAX_CHIRP_LENGTH);
        assert!(clean_body(&body).is_err());
    }

    #[test]
    fn empty_rejected() {
        assert!(clean_body("").is_err());
        assert!(clean_body("   ").is_err());
    }

    #[test]
    fn banned_words_masked() {
        assert_eq!(clean_body("what a Fornax day").unwrap(), "what a **** day");
    }
}
