use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use chirpy_auth::hash_password;
use chirpy_db::models::UserUpdate;
use chirpy_types::api::CredentialsRequest;
use chirpy_types::models::User;

use crate::convert::user_from_row;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call, run_blocking};

fn validate_credentials(req: &CredentialsRequest) -> Result<(), ApiError> {
    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".into()));
    }
    Ok(())
}

/// Argon2 is deliberately slow, so it runs on the blocking pool.
async fn hash(password: String) -> Result<String, ApiError> {
    run_blocking(move || hash_password(&password)).await?.map_err(|e| {
        error!("Couldn't hash password: {}", e);
        ApiError::Internal("Couldn't hash password".into())
    })
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate_credentials(&req)?;

    let email = req.email.clone();
    let taken = db_call(&state, "Couldn't create user", move |db| db.get_user_by_email(&email))
        .await?
        .is_some();
    if taken {
        return Err(ApiError::Conflict("Email is already registered".into()));
    }

    let hashed_password = hash(req.password).await?;
    let user_id = Uuid::new_v4();
    let email = req.email;

    let row = db_call(&state, "Couldn't create user", move |db| {
        db.create_user(&user_id.to_string(), &email, &hashed_password, Utc::now())
    })
    .await?
    // lost a race with a concurrent registration of the same email
    .ok_or_else(|| ApiError::Conflict("Email is already registered".into()))?;

    info!("Registered user {}", user_id);
    Ok((StatusCode::CREATED, Json(user_from_row(row)?)))
}

/// PUT /api/users — replace the caller's email and password.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload?;
    validate_credentials(&req)?;

    let email = req.email.clone();
    let owner = db_call(&state, "Couldn't update user", move |db| db.get_user_by_email(&email))
        .await?;
    if owner.is_some_and(|row| row.id != user_id.to_string()) {
        return Err(ApiError::Conflict("Email is already registered".into()));
    }

    let hashed_password = hash(req.password).await?;
    let email = req.email;

    let outcome = db_call(&state, "Couldn't update user", move |db| {
        db.update_user(&user_id.to_string(), &email, &hashed_password, Utc::now())
    })
    .await?;

    let row = match outcome {
        UserUpdate::Updated(row) => row,
        UserUpdate::EmailTaken => {
            return Err(ApiError::Conflict("Email is already registered".into()));
        }
        // valid token for a user removed by an admin reset
        UserUpdate::NotFound => {
            return Err(ApiError::Unauthorized("User is not authorized".into()));
        }
    };

    info!("Updated user {}", user_id);
    Ok(Json(user_from_row(row)?))
}
