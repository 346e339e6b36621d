use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;
use uuid::Uuid;

use chirpy_auth::validate_token;

use crate::error::ApiError;
use crate::state::AppState;

/// The user a validated session token was issued to.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Key from an `Authorization: ApiKey <key>` header.
pub fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("ApiKey "))
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Validate the session token and hand the caller's id to the handler as [`AuthUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("User is not authorized".into()))?;

    let user_id = validate_token(&token, &state.config.jwt_secret).map_err(|e| {
        debug!("Rejected session token: {}", e);
        ApiError::Unauthorized("User is not authorized".into())
    })?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).as_deref(), Some("abc.def"));
        assert_eq!(bearer_token(&headers("ApiKey abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn extracts_api_key() {
        assert_eq!(
            api_key(&headers("ApiKey f271c81ff7084ee5b99a5091b42d486e")),
            Some("f271c81ff7084ee5b99a5091b42d486e")
        );
        assert_eq!(api_key(&headers("Bearer abc")), None);
        assert_eq!(api_key(&headers("ApiKey ")), None);
    }
}
