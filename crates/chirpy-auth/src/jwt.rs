use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;
use uuid::Uuid;

use chirpy_types::api::Claims;

/// Issuer stamped into every session token and required on validation.
pub const ISSUER: &str = "chirpy";

/// Lifetime of a session token handed out by login and refresh.
pub const SESSION_TTL: Duration = Duration::hours(1);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Sign a session token for `user_id` that expires `ttl` from now.
pub fn issue_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        iss: ISSUER.to_string(),
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Check signature and expiry, returning the user id the token was issued to.
pub fn validate_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    })?;

    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-with-enough-entropy";

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_validates() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, SECRET, SESSION_TTL).unwrap();
        assert_eq!(validate_token(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: Uuid::new_v4(),
            iat: issued.timestamp(),
            exp: (issued + SESSION_TTL).timestamp(),
        };
        let token = sign(&claims, SECRET);
        assert!(matches!(validate_token(&token, SECRET), Err(TokenError::Expired)));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token(Uuid::new_v4(), SECRET, SESSION_TTL).unwrap();
        assert!(matches!(
            validate_token(&token, "some-other-secret"),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(validate_token("not.a.jwt", SECRET), Err(TokenError::Malformed)));
        assert!(matches!(validate_token("", SECRET), Err(TokenError::Malformed)));
    }

    #[test]
    fn foreign_issuer_rejected() {
        let now = Utc::now();
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + SESSION_TTL).timestamp(),
        };
        let token = sign(&claims, SECRET);
        assert!(matches!(validate_token(&token, SECRET), Err(TokenError::Malformed)));
    }
}
