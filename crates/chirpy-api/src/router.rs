use std::path::Path;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::hits::count_hits;
use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{admin, auth, chirps, polka, users};

/// All Chirpy routes. Static files in `assets_dir` are served under `/app/`
/// and counted by the hit counter.
pub fn router(state: AppState, assets_dir: impl AsRef<Path>) -> Router {
    let public_routes = Router::new()
        .route("/api/healthz", get(admin::healthz))
        .route("/api/users", post(users::register))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route("/api/chirps", get(chirps::list_chirps))
        .route("/api/chirps/{chirp_id}", get(chirps::get_chirp))
        .route("/api/polka/webhooks", post(polka::webhook))
        .route("/admin/metrics", get(admin::metrics))
        .route("/admin/reset", post(admin::reset))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/users", put(users::update_user))
        .route("/api/chirps", post(chirps::create_chirp))
        .route("/api/chirps/{chirp_id}", delete(chirps::delete_chirp))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let static_routes = Router::new()
        .nest_service("/app", ServeDir::new(assets_dir.as_ref()))
        .layer(middleware::from_fn_with_state(state, count_hits));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(static_routes)
}
