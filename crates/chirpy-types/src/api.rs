use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// -- JWT Claims --

/// Session token claims. `sub` is the user the token was issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

// -- Users --

/// Body of both `POST /api/users` and `PUT /api/users`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

// -- Chirps --

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

// -- Webhooks --

#[derive(Debug, Deserialize)]
pub struct PolkaWebhookRequest {
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: Uuid,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
