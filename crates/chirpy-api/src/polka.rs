use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use tracing::{debug, info};

use chirpy_types::api::PolkaWebhookRequest;

use crate::error::ApiError;
use crate::middleware::api_key;
use crate::state::{AppState, db_call};

/// The only Polka event we act on; everything else is acknowledged and ignored.
pub const USER_UPGRADED: &str = "user.upgraded";

/// POST /api/polka/webhooks — payment provider notifies us of a Chirpy Red upgrade.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PolkaWebhookRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let presented = api_key(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Couldn't find api key".into()))?;
    if state.config.polka_key.as_deref() != Some(presented) {
        debug!("Webhook rejected: API key mismatch");
        return Err(ApiError::Unauthorized("API key is invalid".into()));
    }

    let Json(req) = payload?;
    if req.event != USER_UPGRADED {
        debug!("Ignoring webhook event {}", req.event);
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = req.data.user_id;
    let upgraded = db_call(&state, "Couldn't update user", move |db| {
        db.upgrade_user_to_red(&user_id.to_string(), Utc::now())
    })
    .await?;

    if !upgraded {
        return Err(ApiError::NotFound("Couldn't find user".into()));
    }

    info!("User {} upgraded to Chirpy Red", user_id);
    Ok(StatusCode::NO_CONTENT)
}
