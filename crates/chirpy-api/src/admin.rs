use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::{AppState, db_call};

/// GET /api/healthz
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

/// GET /admin/metrics
pub async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>",
        state.hits.load()
    ))
}

/// POST /admin/reset — wipe all users (and with them chirps and sessions) and
/// zero the hit counter. Only available on the `dev` platform.
pub async fn reset(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if !state.config.platform.is_dev() {
        warn!("Refused /admin/reset outside the dev platform");
        return Err(ApiError::Forbidden("Reset is only allowed in dev environment".into()));
    }

    let deleted = db_call(&state, "Couldn't reset database", |db| db.delete_all_users()).await?;
    state.hits.reset();

    info!("Reset: deleted {} users, hit counter zeroed", deleted);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Hits reset to 0 and database reset to initial state.",
    ))
}
