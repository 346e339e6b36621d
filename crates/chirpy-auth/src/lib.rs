//! Chirpy authentication primitives.
//!
//! Password hashing (Argon2id), session tokens (HS256 JWT) and opaque
//! refresh-token generation. Nothing in here touches the database or HTTP.

pub mod jwt;
pub mod password;
pub mod refresh;

pub use jwt::{SESSION_TTL, TokenError, issue_token, validate_token};
pub use password::{PasswordError, hash_password, verify_password};
pub use refresh::{REFRESH_TOKEN_TTL, make_refresh_token};
