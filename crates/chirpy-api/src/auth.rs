use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use chirpy_auth::{SESSION_TTL, issue_token, verify_password};
use chirpy_types::api::{LoginRequest, LoginResponse, RefreshResponse};

use crate::convert::user_from_row;
use crate::error::ApiError;
use crate::middleware::bearer_token;
use crate::sessions::{self, SessionError};
use crate::state::{AppState, db_call, run_blocking, with_db};

fn session_token(state: &AppState, user_id: Uuid) -> Result<String, ApiError> {
    issue_token(user_id, &state.config.jwt_secret, SESSION_TTL).map_err(|e| {
        error!("Couldn't create JWT for {}: {}", user_id, e);
        ApiError::Internal("Couldn't create JWT".into())
    })
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;

    let email = req.email.clone();
    let row = db_call(&state, "Couldn't find user", move |db| db.get_user_by_email(&email))
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".into()))?;

    let password = req.password;
    let hashed_password = row.hashed_password.clone();
    if !run_blocking(move || verify_password(&password, &hashed_password)).await? {
        debug!("Password mismatch for user {}", row.id);
        return Err(ApiError::Unauthorized("Incorrect email or password".into()));
    }

    let user = user_from_row(row)?;
    let token = session_token(&state, user.id)?;

    let user_id = user.id;
    let refresh_token = with_db(&state, move |db| sessions::issue(db, user_id, Utc::now()))
        .await?
        .map_err(|e| {
            error!("Couldn't create refresh token for {}: {}", user_id, e);
            ApiError::Internal("Couldn't create refresh token".into())
        })?;

    info!("User {} logged in", user.id);
    Ok(Json(LoginResponse {
        user,
        token,
        refresh_token,
    }))
}

/// POST /api/refresh — trade a refresh token for a new session token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let refresh_token =
        bearer_token(&headers).ok_or_else(|| ApiError::BadRequest("Couldn't find token".into()))?;

    let user_id = with_db(&state, move |db| sessions::resolve(db, &refresh_token, Utc::now()))
        .await?
        .map_err(|e| match e {
            SessionError::Store(cause) => {
                error!("Couldn't resolve refresh token: {}", cause);
                ApiError::Internal("Couldn't get user for refresh token".into())
            }
            rejected => {
                debug!("Refresh rejected: {}", rejected);
                ApiError::Unauthorized("Couldn't get user for refresh token".into())
            }
        })?;

    let token = session_token(&state, user_id)?;
    Ok(Json(RefreshResponse { token }))
}

/// POST /api/revoke — succeeds again for a token that is already revoked.
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token =
        bearer_token(&headers).ok_or_else(|| ApiError::BadRequest("Couldn't find token".into()))?;

    with_db(&state, move |db| sessions::revoke(db, &refresh_token, Utc::now()))
        .await?
        .map_err(|e| match e {
            SessionError::NotFound => ApiError::BadRequest("Couldn't find token".into()),
            other => {
                error!("Couldn't revoke session: {}", other);
                ApiError::Internal("Couldn't revoke session".into())
            }
        })?;

    Ok(StatusCode::NO_CONTENT)
}
